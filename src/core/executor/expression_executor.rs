// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Debug;

use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::EmberResult;
use crate::core::event::value::{AttributeValue, Row};
use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// A compiled scalar expression. Executors are built once per statement and
/// evaluated per row; per-row failures come back as errors, NULL inputs as
/// `AttributeValue::Null`.
pub trait ExpressionExecutor: Debug + Send + Sync {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue>;

    /// Static result type, known before any row is seen.
    fn get_return_type(&self) -> ApiAttributeType;

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor>;
}

impl Clone for Box<dyn ExpressionExecutor> {
    fn clone(&self) -> Self {
        self.clone_executor()
    }
}

/// Evaluates every argument, in order, before any of them is inspected.
pub fn execute_all(
    executors: &[Box<dyn ExpressionExecutor>],
    ctx: &ExecutionContext,
    row: &Row,
) -> EmberResult<Vec<AttributeValue>> {
    executors.iter().map(|e| e.execute(ctx, row)).collect()
}
