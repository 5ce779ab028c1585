// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod constant_executor;
pub mod expression_executor;
pub mod function;
pub mod variable_executor;

pub use self::constant_executor::ConstantExpressionExecutor;
pub use self::expression_executor::{execute_all, ExpressionExecutor};
pub use self::variable_executor::VariableExpressionExecutor;
