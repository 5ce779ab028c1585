// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod subsystem;

pub use self::subsystem::{LockState, LockSubsystem, LockTimeout, SessionId, NO_SESSION};
