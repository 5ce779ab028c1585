// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::{EmberError, EmberResult};
use crate::core::event::value::{AttributeValue, Row};
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// Reads one column of the current row.
#[derive(Debug, Clone)]
pub struct VariableExpressionExecutor {
    index: usize,
    return_type: ApiAttributeType,
    attribute_name: String,
}

impl VariableExpressionExecutor {
    pub fn new(
        index: usize,
        return_type: ApiAttributeType,
        attribute_name: impl Into<String>,
    ) -> Self {
        Self {
            index,
            return_type,
            attribute_name: attribute_name.into(),
        }
    }
}

impl ExpressionExecutor for VariableExpressionExecutor {
    fn execute(&self, _ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        row.get(self.index).cloned().ok_or_else(|| {
            EmberError::runtime(format!(
                "column '{}' at index {} is outside a row of width {}",
                self.attribute_name,
                self.index,
                row.len()
            ))
        })
    }

    fn get_return_type(&self) -> ApiAttributeType {
        self.return_type
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(self.clone())
    }
}
