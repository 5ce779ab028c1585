// SPDX-License-Identifier: MIT OR Apache-2.0

//! EmberSQL builtin functions: MySQL-compatible named advisory locks and
//! the spatial WKB codec, exposed through a small expression-executor engine.

pub mod core;
pub mod query_api;

pub use crate::core::config::{EngineConfig, ExecutionContext, FlatConfig, PropertySource};
pub use crate::core::engine::Engine;
pub use crate::core::error::{EmberError, EmberResult};
pub use crate::core::event::{AttributeValue, Row};
pub use crate::core::util::init_logging;
