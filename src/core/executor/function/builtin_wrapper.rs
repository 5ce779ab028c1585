// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::engine_config::SpatialConfig;
use crate::core::error::{EmberError, EmberResult};
use crate::core::executor::expression_executor::ExpressionExecutor;
use crate::core::executor::function::argument_helpers::check_arity;
use crate::core::executor::function::*;
use crate::core::lock::LockSubsystem;
use crate::core::spatial::GeometryKind;
use std::collections::HashMap;
use std::sync::Arc;

pub type BuiltinBuilder = Arc<
    dyn Fn(Vec<Box<dyn ExpressionExecutor>>) -> EmberResult<Box<dyn ExpressionExecutor>>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct BuiltinScalarFunction {
    pub name: &'static str,
    pub builder: BuiltinBuilder,
}

impl std::fmt::Debug for BuiltinScalarFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinScalarFunction")
            .field("name", &self.name)
            .finish()
    }
}

impl BuiltinScalarFunction {
    pub fn new<F>(name: &'static str, builder: F) -> Self
    where
        F: Fn(Vec<Box<dyn ExpressionExecutor>>) -> EmberResult<Box<dyn ExpressionExecutor>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            builder: Arc::new(builder),
        }
    }

    pub fn build(
        &self,
        args: Vec<Box<dyn ExpressionExecutor>>,
    ) -> EmberResult<Box<dyn ExpressionExecutor>> {
        (self.builder)(args)
    }
}

/// Builtin functions keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, BuiltinScalarFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: BuiltinScalarFunction) {
        self.functions
            .insert(function.name.to_ascii_lowercase(), function);
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinScalarFunction> {
        self.functions.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn build(
        &self,
        name: &str,
        args: Vec<Box<dyn ExpressionExecutor>>,
    ) -> EmberResult<Box<dyn ExpressionExecutor>> {
        self.get(name)
            .ok_or_else(|| EmberError::function_not_found(name))?
            .build(args)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|f| f.name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// --- Builtin builder helpers ---

fn single(args: Vec<Box<dyn ExpressionExecutor>>) -> Box<dyn ExpressionExecutor> {
    let mut args = args;
    args.remove(0)
}

fn pair(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> (Box<dyn ExpressionExecutor>, Box<dyn ExpressionExecutor>) {
    let mut a = args;
    let second = a.remove(1);
    let first = a.remove(0);
    (first, second)
}

fn build_get_lock(
    args: Vec<Box<dyn ExpressionExecutor>>,
    locks: &Arc<LockSubsystem>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("get_lock", &args, 2, 2)?;
    let (name, timeout) = pair(args);
    Ok(Box::new(GetLockFunctionExecutor::new(
        name,
        timeout,
        Arc::clone(locks),
    )?))
}

fn build_release_lock(
    args: Vec<Box<dyn ExpressionExecutor>>,
    locks: &Arc<LockSubsystem>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("release_lock", &args, 1, 1)?;
    Ok(Box::new(NamedLockFunctionExecutor::release_lock(
        single(args),
        Arc::clone(locks),
    )?))
}

fn build_is_free_lock(
    args: Vec<Box<dyn ExpressionExecutor>>,
    locks: &Arc<LockSubsystem>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("is_free_lock", &args, 1, 1)?;
    Ok(Box::new(NamedLockFunctionExecutor::is_free_lock(
        single(args),
        Arc::clone(locks),
    )?))
}

fn build_is_used_lock(
    args: Vec<Box<dyn ExpressionExecutor>>,
    locks: &Arc<LockSubsystem>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("is_used_lock", &args, 1, 1)?;
    Ok(Box::new(NamedLockFunctionExecutor::is_used_lock(
        single(args),
        Arc::clone(locks),
    )?))
}

fn build_release_all_locks(
    args: Vec<Box<dyn ExpressionExecutor>>,
    locks: &Arc<LockSubsystem>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("release_all_locks", &args, 0, 0)?;
    Ok(Box::new(ReleaseAllLocksFunctionExecutor::new(Arc::clone(locks))))
}

fn build_as_wkb(
    function: &'static str,
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity(function, &args, 1, 1)?;
    Ok(Box::new(AsWkbFunctionExecutor::new(function, single(args))))
}

fn build_from_wkb(
    function: &'static str,
    expected: Option<GeometryKind>,
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity(function, &args, 1, 3)?;
    Ok(Box::new(GeomFromWkbFunctionExecutor::new(function, expected, args)))
}

fn build_as_wkt(
    function: &'static str,
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity(function, &args, 1, 1)?;
    Ok(Box::new(AsWktFunctionExecutor::new(function, single(args))))
}

fn build_as_geojson(
    args: Vec<Box<dyn ExpressionExecutor>>,
    max_precision: u32,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("st_asgeojson", &args, 1, 3)?;
    Ok(Box::new(AsGeoJsonFunctionExecutor::new(args, max_precision)))
}

fn build_dimension(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("st_dimension", &args, 1, 1)?;
    Ok(Box::new(DimensionFunctionExecutor::new(single(args))))
}

fn build_srid(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("st_srid", &args, 1, 2)?;
    let mut args = args.into_iter();
    let (Some(geom), srid) = (args.next(), args.next()) else {
        return Err(EmberError::invalid_argument_number("st_srid", "1 to 2", 0));
    };
    Ok(Box::new(SridFunctionExecutor::new(geom, srid)))
}

fn build_swap_xy(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("st_swapxy", &args, 1, 1)?;
    Ok(Box::new(SwapXyFunctionExecutor::new(single(args))))
}

fn build_point(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("point", &args, 2, 2)?;
    let (x, y) = pair(args);
    Ok(Box::new(PointFunctionExecutor::new(x, y)))
}

fn build_linestring(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("linestring", &args, 2, usize::MAX)?;
    Ok(Box::new(LineStringFunctionExecutor::new(args)))
}

fn build_polygon(
    args: Vec<Box<dyn ExpressionExecutor>>,
) -> EmberResult<Box<dyn ExpressionExecutor>> {
    check_arity("polygon", &args, 1, usize::MAX)?;
    Ok(Box::new(PolygonFunctionExecutor::new(args)))
}

/// SQL name, name used in error messages, and the kind the decoder insists on.
const FROM_WKB_FUNCTIONS: &[(&str, &str, Option<GeometryKind>)] = &[
    ("st_geomfromwkb", "ST_GeomFromWKB", None),
    ("st_geometryfromwkb", "ST_GeometryFromWKB", None),
    ("st_pointfromwkb", "ST_PointFromWKB", Some(GeometryKind::Point)),
    ("st_linefromwkb", "ST_LineFromWKB", Some(GeometryKind::LineString)),
    ("st_linestringfromwkb", "ST_LineStringFromWKB", Some(GeometryKind::LineString)),
    ("st_polyfromwkb", "ST_PolyFromWKB", Some(GeometryKind::Polygon)),
    ("st_polygonfromwkb", "ST_PolygonFromWKB", Some(GeometryKind::Polygon)),
    ("st_mpointfromwkb", "ST_MPointFromWKB", Some(GeometryKind::MultiPoint)),
    ("st_multipointfromwkb", "ST_MultiPointFromWKB", Some(GeometryKind::MultiPoint)),
    ("st_mlinefromwkb", "ST_MLineFromWKB", Some(GeometryKind::MultiLineString)),
    (
        "st_multilinestringfromwkb",
        "ST_MultiLineStringFromWKB",
        Some(GeometryKind::MultiLineString),
    ),
    ("st_mpolyfromwkb", "ST_MPolyFromWKB", Some(GeometryKind::MultiPolygon)),
    ("st_multipolygonfromwkb", "ST_MultiPolygonFromWKB", Some(GeometryKind::MultiPolygon)),
    ("st_geomcollfromwkb", "ST_GeomCollFromWKB", Some(GeometryKind::GeometryCollection)),
    (
        "st_geometrycollectionfromwkb",
        "ST_GeometryCollectionFromWKB",
        Some(GeometryKind::GeometryCollection),
    ),
];

pub fn register_builtin_scalar_functions(
    registry: &mut FunctionRegistry,
    locks: &Arc<LockSubsystem>,
    spatial: &SpatialConfig,
) {
    let l = Arc::clone(locks);
    registry.register(BuiltinScalarFunction::new("get_lock", move |args| {
        build_get_lock(args, &l)
    }));
    let l = Arc::clone(locks);
    registry.register(BuiltinScalarFunction::new("release_lock", move |args| {
        build_release_lock(args, &l)
    }));
    let l = Arc::clone(locks);
    registry.register(BuiltinScalarFunction::new("is_free_lock", move |args| {
        build_is_free_lock(args, &l)
    }));
    let l = Arc::clone(locks);
    registry.register(BuiltinScalarFunction::new("is_used_lock", move |args| {
        build_is_used_lock(args, &l)
    }));
    let l = Arc::clone(locks);
    registry.register(BuiltinScalarFunction::new("release_all_locks", move |args| {
        build_release_all_locks(args, &l)
    }));

    registry.register(BuiltinScalarFunction::new("st_aswkb", |args| {
        build_as_wkb("ST_AsWKB", args)
    }));
    // st_asbinary is an alias for st_aswkb
    registry.register(BuiltinScalarFunction::new("st_asbinary", |args| {
        build_as_wkb("ST_AsBinary", args)
    }));
    for &(name, display, expected) in FROM_WKB_FUNCTIONS {
        registry.register(BuiltinScalarFunction::new(name, move |args| {
            build_from_wkb(display, expected, args)
        }));
    }

    registry.register(BuiltinScalarFunction::new("st_aswkt", |args| {
        build_as_wkt("st_aswkt", args)
    }));
    // st_astext is an alias for st_aswkt
    registry.register(BuiltinScalarFunction::new("st_astext", |args| {
        build_as_wkt("st_astext", args)
    }));
    let max_precision = spatial.geojson_max_precision;
    registry.register(BuiltinScalarFunction::new("st_asgeojson", move |args| {
        build_as_geojson(args, max_precision)
    }));
    registry.register(BuiltinScalarFunction::new("st_dimension", build_dimension));
    registry.register(BuiltinScalarFunction::new("st_srid", build_srid));
    registry.register(BuiltinScalarFunction::new("st_swapxy", build_swap_xy));
    registry.register(BuiltinScalarFunction::new("point", build_point));
    registry.register(BuiltinScalarFunction::new("linestring", build_linestring));
    registry.register(BuiltinScalarFunction::new("polygon", build_polygon));
}
