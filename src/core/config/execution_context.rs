// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::lock::SessionId;
use crate::core::util::cancellation::{CancellationHandle, QueryCancellation};

/// Per-session state handed to every executor call.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    session_id: SessionId,
    cancellation: QueryCancellation,
}

impl ExecutionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            cancellation: QueryCancellation::new(),
        }
    }

    #[inline]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Shared flag; clone it to kill the session's running query from
    /// another thread.
    #[inline]
    pub fn cancellation(&self) -> &QueryCancellation {
        &self.cancellation
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.handle()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
