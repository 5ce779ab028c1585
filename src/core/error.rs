// SPDX-License-Identifier: MIT OR Apache-2.0

//! EmberSQL Core Error Types
//!
//! Every failure a builtin function, the lock subsystem or the WKB codec can
//! report. Display strings follow the messages MySQL clients expect.

use thiserror::Error;

use crate::core::lock::SessionId;

/// Result type for EmberSQL operations
pub type EmberResult<T> = Result<T, EmberError>;

#[derive(Error, Debug)]
pub enum EmberError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
    },

    #[error("function '{function}' expected {expected} arguments, {actual} received")]
    InvalidArgumentNumber {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("Illegal parameter data type {type_name} for operation '{function}'")]
    IllegalArgumentType { type_name: String, function: String },

    #[error("Invalid GIS data provided to function {function}.")]
    InvalidGisData { function: String },

    #[error("There's no spatial reference system with SRID {srid}.")]
    InvalidSrid { srid: i64 },

    #[error("Incorrect arguments to {function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("function: '{name}' not found")]
    FunctionNotFound { name: String },

    #[error("Timeout exceeded waiting for lock '{name}'")]
    LockTimeout { name: String },

    #[error("Operation '{operation}' failed as the lock '{name}' is not owned by session {session}")]
    LockNotOwned {
        name: String,
        operation: String,
        session: SessionId,
    },

    #[error("Lock '{name}' does not exist")]
    LockDoesNotExist { name: String },

    #[error("Query execution was interrupted for session {session}")]
    Cancelled { session: SessionId },

    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Custom error creation helpers
impl EmberError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: None,
        }
    }

    /// Create a configuration error with a specific key
    pub fn configuration_with_key(
        message: impl Into<String>,
        config_key: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
        }
    }

    pub fn invalid_argument_number(
        function: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        Self::InvalidArgumentNumber {
            function: function.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn illegal_argument_type(
        type_name: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self::IllegalArgumentType {
            type_name: type_name.into(),
            function: function.into(),
        }
    }

    /// Malformed or mistyped geometry input
    pub fn invalid_gis_data(function: impl Into<String>) -> Self {
        Self::InvalidGisData {
            function: function.into(),
        }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn function_not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound { name: name.into() }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// True for the lock outcomes that SQL functions fold into a 0/NULL result
    /// instead of failing the statement.
    pub fn is_lock_outcome(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout { .. } | Self::LockNotOwned { .. } | Self::LockDoesNotExist { .. }
        )
    }
}
