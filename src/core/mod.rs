// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod executor;
pub mod lock;
pub mod spatial;
pub mod util;
