// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod argument_helpers;
pub mod builtin_wrapper;
pub mod lock_functions;
pub mod spatial_functions;
pub mod wkb_functions;

pub use self::builtin_wrapper::{
    register_builtin_scalar_functions, BuiltinBuilder, BuiltinScalarFunction, FunctionRegistry,
};
pub use self::lock_functions::{
    GetLockFunctionExecutor, NamedLockFunctionExecutor, ReleaseAllLocksFunctionExecutor,
};
pub use self::spatial_functions::{
    AsGeoJsonFunctionExecutor, AsWktFunctionExecutor, DimensionFunctionExecutor,
    LineStringFunctionExecutor, PointFunctionExecutor, PolygonFunctionExecutor,
    SridFunctionExecutor, SwapXyFunctionExecutor,
};
pub use self::wkb_functions::{AsWkbFunctionExecutor, GeomFromWkbFunctionExecutor};
