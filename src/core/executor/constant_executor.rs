// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::EmberResult;
use crate::core::event::value::{AttributeValue, Row};
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// Literal value.
#[derive(Debug, Clone)]
pub struct ConstantExpressionExecutor {
    value: AttributeValue,
    return_type: ApiAttributeType,
}

impl ConstantExpressionExecutor {
    pub fn new(value: AttributeValue) -> Self {
        let return_type = value.get_type();
        Self { value, return_type }
    }

    pub fn get_value(&self) -> &AttributeValue {
        &self.value
    }
}

impl ExpressionExecutor for ConstantExpressionExecutor {
    fn execute(&self, _ctx: &ExecutionContext, _row: &Row) -> EmberResult<AttributeValue> {
        Ok(self.value.clone())
    }

    fn get_return_type(&self) -> ApiAttributeType {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(self.clone())
    }
}
