// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::core::config::{EngineConfig, ExecutionContext};
use crate::core::error::EmberResult;
use crate::core::event::value::AttributeValue;
use crate::core::executor::constant_executor::ConstantExpressionExecutor;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::core::executor::function::{register_builtin_scalar_functions, FunctionRegistry};
use crate::core::lock::{LockSubsystem, SessionId, NO_SESSION};

/// Owns the process-wide lock table and the builtin function registry, and
/// hands out sessions.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    locks: Arc<LockSubsystem>,
    functions: FunctionRegistry,
    next_session_id: AtomicU32,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let locks = Arc::new(LockSubsystem::new(config.lock.clone()));
        let mut functions = FunctionRegistry::new();
        register_builtin_scalar_functions(&mut functions, &locks, &config.spatial);
        log::info!(
            "[Engine] started with {} builtin functions",
            functions.len()
        );
        Self {
            config,
            locks,
            functions,
            next_session_id: AtomicU32::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lock_subsystem(&self) -> &Arc<LockSubsystem> {
        &self.locks
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn open_session(&self) -> ExecutionContext {
        let mut id: SessionId = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        // 0 is reserved for "no owner"
        while id == NO_SESSION {
            id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        }
        log::debug!("[Engine] opened session {}", id);
        ExecutionContext::new(id)
    }

    /// Ends a session, releasing every lock it still holds. Returns the
    /// number of locks released.
    pub fn close_session(&self, ctx: &ExecutionContext) -> EmberResult<usize> {
        let released = self.locks.release_all(ctx.session_id())?;
        log::info!(
            "[Engine] closed session {} ({} locks released)",
            ctx.session_id(),
            released
        );
        Ok(released)
    }

    pub fn build_function(
        &self,
        name: &str,
        args: Vec<Box<dyn ExpressionExecutor>>,
    ) -> EmberResult<Box<dyn ExpressionExecutor>> {
        self.functions.build(name, args)
    }

    /// Calls `name` with literal arguments.
    pub fn evaluate(
        &self,
        ctx: &ExecutionContext,
        name: &str,
        args: Vec<AttributeValue>,
    ) -> EmberResult<AttributeValue> {
        let args = args
            .into_iter()
            .map(|v| Box::new(ConstantExpressionExecutor::new(v)) as Box<dyn ExpressionExecutor>)
            .collect();
        self.build_function(name, args)?.execute(ctx, &Vec::new())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
