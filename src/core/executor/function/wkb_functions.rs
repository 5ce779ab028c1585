// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ST_ASWKB` and the `ST_*FROMWKB` decoder family.

use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::{EmberError, EmberResult};
use crate::core::event::value::{AttributeValue, Row};
use crate::core::executor::expression_executor::{execute_all, ExpressionExecutor};
use crate::core::executor::function::argument_helpers::{axis_order_arg, geometry_arg, srid_arg};
use crate::core::spatial::{wkb, GeometryKind, CARTESIAN_SRID};
use crate::query_api::definition::attribute::Type as ApiAttributeType;

#[derive(Debug)]
pub struct AsWkbFunctionExecutor {
    function: &'static str,
    geom_executor: Box<dyn ExpressionExecutor>,
}

impl AsWkbFunctionExecutor {
    pub fn new(function: &'static str, geom_executor: Box<dyn ExpressionExecutor>) -> Self {
        Self {
            function,
            geom_executor,
        }
    }
}

impl ExpressionExecutor for AsWkbFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let value = self.geom_executor.execute(ctx, row)?;
        if value.is_null() {
            return Ok(AttributeValue::Null);
        }
        let geom = geometry_arg(&value, self.function)?;
        Ok(AttributeValue::Bytes(wkb::serialize(geom)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::BLOB
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(AsWkbFunctionExecutor {
            function: self.function,
            geom_executor: self.geom_executor.clone_executor(),
        })
    }
}

/// `ST_GEOMFROMWKB(wkb [, srid [, options]])` and its type-specific
/// variants, which also require the header to announce `expected`.
#[derive(Debug)]
pub struct GeomFromWkbFunctionExecutor {
    function: &'static str,
    expected: Option<GeometryKind>,
    executors: Vec<Box<dyn ExpressionExecutor>>,
}

impl GeomFromWkbFunctionExecutor {
    /// `executors` holds the blob, then the optional SRID and options
    /// arguments; arity is checked by the builder.
    pub fn new(
        function: &'static str,
        expected: Option<GeometryKind>,
        executors: Vec<Box<dyn ExpressionExecutor>>,
    ) -> Self {
        Self {
            function,
            expected,
            executors,
        }
    }
}

impl ExpressionExecutor for GeomFromWkbFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let values = execute_all(&self.executors, ctx, row)?;
        if values.iter().any(AttributeValue::is_null) {
            return Ok(AttributeValue::Null);
        }

        let Some(AttributeValue::Bytes(blob)) = values.first() else {
            return Err(EmberError::invalid_gis_data(self.function));
        };
        let srid = values
            .get(1)
            .map(|v| srid_arg(v, self.function))
            .transpose()?
            .unwrap_or(CARTESIAN_SRID);
        let axis_order = values
            .get(2)
            .map(|v| axis_order_arg(v, self.function))
            .transpose()?
            .unwrap_or_default();

        let geom = match self.expected {
            Some(kind) => wkb::deserialize_as(blob, kind, srid, self.function)?,
            None => wkb::deserialize(blob, srid, self.function)?,
        };
        let geom = if axis_order.swaps() {
            geom.swap_axes()
        } else {
            geom
        };
        Ok(AttributeValue::Geometry(geom))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        self.expected
            .map(GeometryKind::attribute_type)
            .unwrap_or(ApiAttributeType::GEOMETRY)
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(GeomFromWkbFunctionExecutor {
            function: self.function,
            expected: self.expected,
            executors: self.executors.iter().map(|e| e.clone_executor()).collect(),
        })
    }
}
