// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session query cancellation (`KILL QUERY`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between a running query and whoever may kill it.
/// Clones observe and trigger the same flag.
#[derive(Debug, Clone, Default)]
pub struct QueryCancellation {
    cancelled: Arc<AtomicBool>,
}

impl QueryCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Clears the flag before the session's next statement.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }

    /// Read-only view for code that must observe but never trigger.
    pub fn handle(&self) -> CancellationHandle {
        CancellationHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }
}

/// Handle for checking cancellation
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
