// SPDX-License-Identifier: MIT OR Apache-2.0

//! `GET_LOCK`, `RELEASE_LOCK`, `IS_FREE_LOCK`, `IS_USED_LOCK` and
//! `RELEASE_ALL_LOCKS`.
//!
//! Lock outcomes (timeout, not owner, unknown lock) become result values;
//! only argument errors and cancellation fail the statement.

use std::sync::Arc;

use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::{EmberError, EmberResult};
use crate::core::event::value::{AttributeValue, Row};
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::core::executor::function::argument_helpers::{check_static_type, integer_arg};
use crate::core::lock::{LockState, LockSubsystem, LockTimeout};
use crate::query_api::definition::attribute::Type as ApiAttributeType;

fn lock_name<'a>(value: &'a AttributeValue, function: &str) -> EmberResult<&'a str> {
    match value {
        AttributeValue::String(s) => Ok(s),
        other => Err(EmberError::illegal_argument_type(other.type_name(), function)),
    }
}

/// Folds a lock outcome into its SQL value: 1 on success, 0 for a timeout or
/// a lock held elsewhere, NULL for a lock that was never created.
fn outcome_value(result: EmberResult<()>) -> EmberResult<Option<AttributeValue>> {
    match result {
        Ok(()) => Ok(Some(AttributeValue::Int(1))),
        Err(EmberError::LockDoesNotExist { .. }) => Ok(None),
        Err(e) if e.is_lock_outcome() => Ok(Some(AttributeValue::Int(0))),
        Err(e) => Err(e),
    }
}

#[derive(Debug)]
pub struct GetLockFunctionExecutor {
    name_executor: Box<dyn ExpressionExecutor>,
    timeout_executor: Box<dyn ExpressionExecutor>,
    locks: Arc<LockSubsystem>,
}

impl GetLockFunctionExecutor {
    pub fn new(
        name_executor: Box<dyn ExpressionExecutor>,
        timeout_executor: Box<dyn ExpressionExecutor>,
        locks: Arc<LockSubsystem>,
    ) -> EmberResult<Self> {
        check_static_type("get_lock", name_executor.as_ref(), ApiAttributeType::STRING)?;
        Ok(Self {
            name_executor,
            timeout_executor,
            locks,
        })
    }
}

impl ExpressionExecutor for GetLockFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let name = self.name_executor.execute(ctx, row)?;
        let timeout = self.timeout_executor.execute(ctx, row)?;
        if name.is_null() || timeout.is_null() {
            return Ok(AttributeValue::Null);
        }
        let name = lock_name(&name, "get_lock")?;
        let secs = integer_arg(&timeout, "get_lock", "timeout")?;

        let result = self.locks.lock(
            ctx.session_id(),
            name,
            LockTimeout::from_secs(secs),
            &ctx.cancellation_handle(),
        );
        Ok(outcome_value(result)?.unwrap_or(AttributeValue::Null))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::INT
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(GetLockFunctionExecutor {
            name_executor: self.name_executor.clone_executor(),
            timeout_executor: self.timeout_executor.clone_executor(),
            locks: Arc::clone(&self.locks),
        })
    }
}

/// Per-name lock query; `None` from the logic means SQL NULL.
type NamedLockLogic =
    fn(&LockSubsystem, &ExecutionContext, &str) -> EmberResult<Option<AttributeValue>>;

/// Shared shape of the single-argument lock functions.
#[derive(Debug)]
pub struct NamedLockFunctionExecutor {
    function: &'static str,
    name_executor: Box<dyn ExpressionExecutor>,
    locks: Arc<LockSubsystem>,
    logic: NamedLockLogic,
    return_type: ApiAttributeType,
}

impl NamedLockFunctionExecutor {
    fn new(
        function: &'static str,
        name_executor: Box<dyn ExpressionExecutor>,
        locks: Arc<LockSubsystem>,
        logic: NamedLockLogic,
        return_type: ApiAttributeType,
    ) -> EmberResult<Self> {
        check_static_type(function, name_executor.as_ref(), ApiAttributeType::STRING)?;
        Ok(Self {
            function,
            name_executor,
            locks,
            logic,
            return_type,
        })
    }

    /// `RELEASE_LOCK(name)`: 1 released, 0 held by someone else, NULL unknown.
    pub fn release_lock(
        name_executor: Box<dyn ExpressionExecutor>,
        locks: Arc<LockSubsystem>,
    ) -> EmberResult<Self> {
        Self::new(
            "release_lock",
            name_executor,
            locks,
            |locks, ctx, name| outcome_value(locks.unlock(ctx.session_id(), name)),
            ApiAttributeType::INT,
        )
    }

    /// `IS_FREE_LOCK(name)`: 1 if nobody holds it.
    pub fn is_free_lock(
        name_executor: Box<dyn ExpressionExecutor>,
        locks: Arc<LockSubsystem>,
    ) -> EmberResult<Self> {
        Self::new(
            "is_free_lock",
            name_executor,
            locks,
            |locks, _ctx, name| {
                let (state, _) = locks.get_lock_state(name);
                Ok(Some(AttributeValue::Int(i32::from(state == LockState::Free))))
            },
            ApiAttributeType::INT,
        )
    }

    /// `IS_USED_LOCK(name)`: owning session id, NULL if free.
    pub fn is_used_lock(
        name_executor: Box<dyn ExpressionExecutor>,
        locks: Arc<LockSubsystem>,
    ) -> EmberResult<Self> {
        Self::new(
            "is_used_lock",
            name_executor,
            locks,
            |locks, _ctx, name| match locks.get_lock_state(name) {
                (LockState::InUse, owner) => Ok(Some(AttributeValue::UInt(owner))),
                (LockState::Free, _) => Ok(None),
            },
            ApiAttributeType::UINT,
        )
    }
}

impl ExpressionExecutor for NamedLockFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let name = self.name_executor.execute(ctx, row)?;
        if name.is_null() {
            return Ok(AttributeValue::Null);
        }
        let name = lock_name(&name, self.function)?;
        Ok((self.logic)(&self.locks, ctx, name)?.unwrap_or(AttributeValue::Null))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(NamedLockFunctionExecutor {
            function: self.function,
            name_executor: self.name_executor.clone_executor(),
            locks: Arc::clone(&self.locks),
            logic: self.logic,
            return_type: self.return_type,
        })
    }
}

#[derive(Debug)]
pub struct ReleaseAllLocksFunctionExecutor {
    locks: Arc<LockSubsystem>,
}

impl ReleaseAllLocksFunctionExecutor {
    pub fn new(locks: Arc<LockSubsystem>) -> Self {
        Self { locks }
    }
}

impl ExpressionExecutor for ReleaseAllLocksFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, _row: &Row) -> EmberResult<AttributeValue> {
        let released = self.locks.release_all(ctx.session_id())?;
        Ok(AttributeValue::Long(released as i64))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::LONG
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(ReleaseAllLocksFunctionExecutor {
            locks: Arc::clone(&self.locks),
        })
    }
}
