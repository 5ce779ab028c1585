// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument checks shared by the builtin function executors.

use crate::core::error::{EmberError, EmberResult};
use crate::core::event::value::AttributeValue;
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::core::spatial::{validate_srid, AxisOrder, Geometry};
use crate::query_api::definition::attribute::Type as ApiAttributeType;

/// Rejects argument lists outside `min..=max`.
pub fn check_arity(
    function: &str,
    args: &[Box<dyn ExpressionExecutor>],
    min: usize,
    max: usize,
) -> EmberResult<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = match (min, max) {
        (min, max) if min == max => min.to_string(),
        (min, usize::MAX) => format!("at least {min}"),
        (min, max) => format!("{min} to {max}"),
    };
    Err(EmberError::invalid_argument_number(function, expected, args.len()))
}

/// Construction-time check for arguments whose static type already rules
/// them out. `OBJECT` passes; its value is checked per row.
pub fn check_static_type(
    function: &str,
    executor: &dyn ExpressionExecutor,
    expected: ApiAttributeType,
) -> EmberResult<()> {
    let actual = executor.get_return_type();
    if actual.may_be(expected) {
        Ok(())
    } else {
        Err(EmberError::illegal_argument_type(actual.sql_name(), function))
    }
}

pub fn geometry_arg<'a>(value: &'a AttributeValue, function: &str) -> EmberResult<&'a Geometry> {
    value
        .as_geometry()
        .ok_or_else(|| EmberError::invalid_gis_data(function))
}

pub fn integer_arg(value: &AttributeValue, function: &str, what: &str) -> EmberResult<i64> {
    value.to_i64().ok_or_else(|| {
        EmberError::invalid_argument(function, format!("{what} must be an integer, got '{value}'"))
    })
}

pub fn srid_arg(value: &AttributeValue, function: &str) -> EmberResult<u32> {
    validate_srid(integer_arg(value, function, "srid")?)
}

pub fn axis_order_arg(value: &AttributeValue, function: &str) -> EmberResult<AxisOrder> {
    match value {
        AttributeValue::String(s) => s
            .parse::<AxisOrder>()
            .map_err(|message| EmberError::invalid_argument(function, message)),
        other => Err(EmberError::invalid_argument(
            function,
            format!("invalid options argument '{other}'"),
        )),
    }
}
