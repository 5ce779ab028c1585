// SPDX-License-Identifier: MIT OR Apache-2.0

// Geometry constructors, text renderings and property accessors.
use crate::core::config::execution_context::ExecutionContext;
use crate::core::error::{EmberError, EmberResult};
use crate::core::event::value::{AttributeValue, Row};
use crate::core::executor::expression_executor::{execute_all, ExpressionExecutor};
use crate::core::executor::function::argument_helpers::{geometry_arg, integer_arg, srid_arg};
use crate::core::spatial::geojson::{self, GeoJsonOptions, MAX_FLAGS};
use crate::core::spatial::{wkt, Geometry, LineString, Point, Polygon, CARTESIAN_SRID};
use crate::query_api::definition::attribute::Type as ApiAttributeType;

fn clone_all(executors: &[Box<dyn ExpressionExecutor>]) -> Vec<Box<dyn ExpressionExecutor>> {
    executors.iter().map(|e| e.clone_executor()).collect()
}

#[derive(Debug)]
pub struct PointFunctionExecutor {
    x_executor: Box<dyn ExpressionExecutor>,
    y_executor: Box<dyn ExpressionExecutor>,
}

impl PointFunctionExecutor {
    pub fn new(
        x_executor: Box<dyn ExpressionExecutor>,
        y_executor: Box<dyn ExpressionExecutor>,
    ) -> Self {
        Self {
            x_executor,
            y_executor,
        }
    }
}

impl ExpressionExecutor for PointFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let x = self.x_executor.execute(ctx, row)?;
        let y = self.y_executor.execute(ctx, row)?;
        if x.is_null() || y.is_null() {
            return Ok(AttributeValue::Null);
        }
        let coord = |v: &AttributeValue| {
            v.to_f64().ok_or_else(|| {
                EmberError::invalid_argument("point", format!("'{v}' is not a valid coordinate"))
            })
        };
        let point = Point::new(CARTESIAN_SRID, coord(&x)?, coord(&y)?);
        Ok(AttributeValue::Geometry(Geometry::Point(point)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::POINT
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(PointFunctionExecutor {
            x_executor: self.x_executor.clone_executor(),
            y_executor: self.y_executor.clone_executor(),
        })
    }
}

#[derive(Debug)]
pub struct LineStringFunctionExecutor {
    executors: Vec<Box<dyn ExpressionExecutor>>,
}

impl LineStringFunctionExecutor {
    pub fn new(executors: Vec<Box<dyn ExpressionExecutor>>) -> Self {
        Self { executors }
    }

    fn build(values: &[AttributeValue]) -> EmberResult<LineString> {
        let points = values
            .iter()
            .map(|v| match v {
                AttributeValue::Geometry(Geometry::Point(p)) => Ok(Point {
                    srid: CARTESIAN_SRID,
                    ..*p
                }),
                other => Err(EmberError::illegal_argument_type(
                    other.type_name(),
                    "linestring",
                )),
            })
            .collect::<EmberResult<Vec<_>>>()?;
        Ok(LineString::new(CARTESIAN_SRID, points))
    }
}

impl ExpressionExecutor for LineStringFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let values = execute_all(&self.executors, ctx, row)?;
        if values.iter().any(AttributeValue::is_null) {
            return Ok(AttributeValue::Null);
        }
        Ok(AttributeValue::Geometry(Geometry::LineString(Self::build(&values)?)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::LINESTRING
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(LineStringFunctionExecutor {
            executors: clone_all(&self.executors),
        })
    }
}

#[derive(Debug)]
pub struct PolygonFunctionExecutor {
    executors: Vec<Box<dyn ExpressionExecutor>>,
}

impl PolygonFunctionExecutor {
    pub fn new(executors: Vec<Box<dyn ExpressionExecutor>>) -> Self {
        Self { executors }
    }
}

impl ExpressionExecutor for PolygonFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let values = execute_all(&self.executors, ctx, row)?;
        if values.iter().any(AttributeValue::is_null) {
            return Ok(AttributeValue::Null);
        }
        let mut lines = Vec::with_capacity(values.len());
        for value in &values {
            let AttributeValue::Geometry(Geometry::LineString(line)) = value else {
                return Err(EmberError::illegal_argument_type(value.type_name(), "polygon"));
            };
            if !line.is_linear_ring() {
                let ring = Geometry::LineString(line.clone());
                return Err(EmberError::invalid_argument(
                    "polygon",
                    format!("{ring} is not a closed ring of at least 4 points"),
                ));
            }
            lines.push(line.clone());
        }
        let polygon = Geometry::Polygon(Polygon {
            srid: CARTESIAN_SRID,
            lines,
        });
        Ok(AttributeValue::Geometry(polygon.with_srid(CARTESIAN_SRID)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::POLYGON
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(PolygonFunctionExecutor {
            executors: clone_all(&self.executors),
        })
    }
}

#[derive(Debug)]
pub struct AsWktFunctionExecutor {
    function: &'static str,
    geom_executor: Box<dyn ExpressionExecutor>,
}

impl AsWktFunctionExecutor {
    pub fn new(function: &'static str, geom_executor: Box<dyn ExpressionExecutor>) -> Self {
        Self {
            function,
            geom_executor,
        }
    }
}

impl ExpressionExecutor for AsWktFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let value = self.geom_executor.execute(ctx, row)?;
        if value.is_null() {
            return Ok(AttributeValue::Null);
        }
        let geom = geometry_arg(&value, self.function)?;
        Ok(AttributeValue::String(wkt::to_wkt(geom)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::STRING
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(AsWktFunctionExecutor {
            function: self.function,
            geom_executor: self.geom_executor.clone_executor(),
        })
    }
}

/// `ST_ASGEOJSON(g [, precision [, flags]])`
#[derive(Debug)]
pub struct AsGeoJsonFunctionExecutor {
    executors: Vec<Box<dyn ExpressionExecutor>>,
    max_precision: u32,
}

impl AsGeoJsonFunctionExecutor {
    const NAME: &'static str = "st_asgeojson";

    pub fn new(executors: Vec<Box<dyn ExpressionExecutor>>, max_precision: u32) -> Self {
        Self {
            executors,
            max_precision,
        }
    }

    fn options(
        &self,
        precision: Option<&AttributeValue>,
        flags: Option<&AttributeValue>,
    ) -> EmberResult<GeoJsonOptions> {
        let precision = precision
            .map(|v| {
                let p = integer_arg(v, Self::NAME, "precision")?;
                if p < 0 {
                    return Err(EmberError::invalid_argument(
                        Self::NAME,
                        format!("incorrect precision value {p}"),
                    ));
                }
                Ok(u32::try_from(p).unwrap_or(u32::MAX).min(self.max_precision))
            })
            .transpose()?;
        let flags = match flags {
            Some(v) => {
                let f = integer_arg(v, Self::NAME, "flags")?;
                u8::try_from(f)
                    .ok()
                    .filter(|f| *f <= MAX_FLAGS)
                    .ok_or_else(|| {
                        EmberError::invalid_argument(
                            Self::NAME,
                            format!("incorrect flags value {f}"),
                        )
                    })?
            }
            None => 0,
        };
        Ok(GeoJsonOptions { precision, flags })
    }
}

impl ExpressionExecutor for AsGeoJsonFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let values = execute_all(&self.executors, ctx, row)?;
        if values.iter().any(AttributeValue::is_null) {
            return Ok(AttributeValue::Null);
        }
        let Some(first) = values.first() else {
            return Err(EmberError::invalid_gis_data(Self::NAME));
        };
        let geom = geometry_arg(first, Self::NAME)?;
        let options = self.options(values.get(1), values.get(2))?;
        Ok(AttributeValue::Json(geojson::to_geojson(geom, &options)))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::JSON
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(AsGeoJsonFunctionExecutor {
            executors: clone_all(&self.executors),
            max_precision: self.max_precision,
        })
    }
}

#[derive(Debug)]
pub struct DimensionFunctionExecutor {
    geom_executor: Box<dyn ExpressionExecutor>,
}

impl DimensionFunctionExecutor {
    pub fn new(geom_executor: Box<dyn ExpressionExecutor>) -> Self {
        Self { geom_executor }
    }
}

impl ExpressionExecutor for DimensionFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let value = self.geom_executor.execute(ctx, row)?;
        if value.is_null() {
            return Ok(AttributeValue::Null);
        }
        let geom = geometry_arg(&value, "st_dimension")?;
        Ok(geom
            .dimension()
            .map(AttributeValue::Int)
            .unwrap_or(AttributeValue::Null))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        ApiAttributeType::INT
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(DimensionFunctionExecutor {
            geom_executor: self.geom_executor.clone_executor(),
        })
    }
}

/// `ST_SRID(g)` reads the SRID; `ST_SRID(g, srid)` returns a re-tagged copy.
#[derive(Debug)]
pub struct SridFunctionExecutor {
    geom_executor: Box<dyn ExpressionExecutor>,
    srid_executor: Option<Box<dyn ExpressionExecutor>>,
}

impl SridFunctionExecutor {
    pub fn new(
        geom_executor: Box<dyn ExpressionExecutor>,
        srid_executor: Option<Box<dyn ExpressionExecutor>>,
    ) -> Self {
        Self {
            geom_executor,
            srid_executor,
        }
    }
}

impl ExpressionExecutor for SridFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let value = self.geom_executor.execute(ctx, row)?;
        let new_srid = match &self.srid_executor {
            Some(e) => Some(e.execute(ctx, row)?),
            None => None,
        };
        if value.is_null() || new_srid.as_ref().is_some_and(AttributeValue::is_null) {
            return Ok(AttributeValue::Null);
        }
        let geom = geometry_arg(&value, "st_srid")?;
        match new_srid {
            None => Ok(AttributeValue::UInt(geom.srid())),
            Some(srid) => {
                let srid = srid_arg(&srid, "st_srid")?;
                Ok(AttributeValue::Geometry(geom.with_srid(srid)))
            }
        }
    }

    fn get_return_type(&self) -> ApiAttributeType {
        match self.srid_executor {
            Some(_) => self.geom_executor.get_return_type(),
            None => ApiAttributeType::UINT,
        }
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(SridFunctionExecutor {
            geom_executor: self.geom_executor.clone_executor(),
            srid_executor: self.srid_executor.as_ref().map(|e| e.clone_executor()),
        })
    }
}

#[derive(Debug)]
pub struct SwapXyFunctionExecutor {
    geom_executor: Box<dyn ExpressionExecutor>,
}

impl SwapXyFunctionExecutor {
    pub fn new(geom_executor: Box<dyn ExpressionExecutor>) -> Self {
        Self { geom_executor }
    }
}

impl ExpressionExecutor for SwapXyFunctionExecutor {
    fn execute(&self, ctx: &ExecutionContext, row: &Row) -> EmberResult<AttributeValue> {
        let value = self.geom_executor.execute(ctx, row)?;
        if value.is_null() {
            return Ok(AttributeValue::Null);
        }
        let geom = geometry_arg(&value, "st_swapxy")?;
        Ok(AttributeValue::Geometry(geom.swap_axes()))
    }

    fn get_return_type(&self) -> ApiAttributeType {
        self.geom_executor.get_return_type()
    }

    fn clone_executor(&self) -> Box<dyn ExpressionExecutor> {
        Box::new(SwapXyFunctionExecutor {
            geom_executor: self.geom_executor.clone_executor(),
        })
    }
}
