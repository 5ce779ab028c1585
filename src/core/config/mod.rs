// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod engine_config;
pub mod execution_context;
pub mod flat_config;

pub use self::engine_config::{EngineConfig, LockConfig, LogLevel, LoggingConfig, SpatialConfig};
pub use self::execution_context::ExecutionContext;
pub use self::flat_config::{FlatConfig, PropertySource};
