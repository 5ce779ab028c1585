// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod cancellation;
pub mod logging;

pub use self::cancellation::{CancellationHandle, QueryCancellation};
pub use self::logging::init_logging;
