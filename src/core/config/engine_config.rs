// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed engine configuration.
//!
//! Settings resolve from [`FlatConfig`] layers (defaults, file, environment,
//! command line). Files may also be deserialized directly with serde:
//!
//! ```toml
//! [lock]
//! wait-slice-ms = 100
//! max-timeout-secs = 3600
//!
//! [spatial]
//! geojson-max-precision = 17
//!
//! [logging]
//! level = "warn"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::flat_config::{FlatConfig, PropertySource};
use crate::core::error::{EmberError, EmberResult};
use crate::core::spatial::geojson::MAX_PRECISION;

/// Log level for the `env_logger` backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    /// Default level
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Parse log level from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "Invalid log level '{}'. Valid values: 'trace', 'debug', 'info', 'warn', 'error'",
                s
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LockConfig {
    /// Longest single condvar wait before a waiting `GET_LOCK` re-checks its
    /// session's cancellation flag.
    pub wait_slice_ms: u64,
    /// Upper bound applied to positive `GET_LOCK` timeouts.
    pub max_timeout_secs: Option<u64>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait_slice_ms: 100,
            max_timeout_secs: None,
        }
    }
}

impl LockConfig {
    /// Never shorter than a millisecond, so an infinite wait still sleeps.
    #[inline]
    pub fn wait_slice(&self) -> Duration {
        Duration::from_millis(self.wait_slice_ms.max(1))
    }

    #[inline]
    pub fn max_timeout(&self) -> Option<Duration> {
        self.max_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SpatialConfig {
    /// Precision cap for `ST_ASGEOJSON`.
    pub geojson_max_precision: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            geojson_max_precision: MAX_PRECISION,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lock: LockConfig,
    pub spatial: SpatialConfig,
    pub logging: LoggingConfig,
}

fn parse_key<T: FromStr>(config: &FlatConfig, key: &str, expected: &str) -> EmberResult<Option<T>> {
    config
        .get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                EmberError::configuration_with_key(
                    format!("{key} must be {expected}, got '{raw}'"),
                    key,
                )
            })
        })
        .transpose()
}

impl EngineConfig {
    /// Default location of the configuration file, `<config dir>/embersql/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("embersql").join("config.toml"))
    }

    pub fn from_toml_str(text: &str) -> EmberResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| EmberError::configuration(format!("invalid TOML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> EmberResult<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| EmberError::configuration(format!("invalid YAML configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a `.toml`, `.yaml` or `.yml` file into a property layer.
    pub fn read_file_layer(path: &Path) -> EmberResult<FlatConfig> {
        let text = std::fs::read_to_string(path)?;
        let table: toml::Table = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text).map_err(|e| {
                EmberError::configuration(format!("invalid YAML in {}: {e}", path.display()))
            })?,
            _ => toml::from_str(&text).map_err(|e| {
                EmberError::configuration(format!("invalid TOML in {}: {e}", path.display()))
            })?,
        };
        let mut layer = FlatConfig::new();
        layer.set_toml_table("", &table, PropertySource::ConfigFile);
        log::debug!(
            "[Config] loaded {} properties from {}",
            layer.len(),
            path.display()
        );
        Ok(layer)
    }

    /// Resolves the full configuration: defaults, then `path` (if any), then
    /// `EMBERSQL_*` environment variables, then `overrides`.
    pub fn load(path: Option<&Path>, overrides: &FlatConfig) -> EmberResult<Self> {
        let mut flat = FlatConfig::new();
        if let Some(path) = path {
            flat.merge(&Self::read_file_layer(path)?);
        }
        flat.apply_env_vars(std::env::vars());
        flat.merge(overrides);
        Self::from_flat_config(&flat)
    }

    /// Builds the typed configuration, falling back to defaults for missing
    /// keys.
    pub fn from_flat_config(config: &FlatConfig) -> EmberResult<Self> {
        let defaults = Self::default();

        for key in config.keys() {
            if !matches!(
                key.as_str(),
                "lock.wait-slice-ms"
                    | "lock.max-timeout-secs"
                    | "spatial.geojson-max-precision"
                    | "logging.level"
            ) {
                log::warn!("[Config] ignoring unknown property '{}'", key);
            }
        }

        let lock = LockConfig {
            wait_slice_ms: parse_key(config, "lock.wait-slice-ms", "a positive integer")?
                .unwrap_or(defaults.lock.wait_slice_ms),
            max_timeout_secs: parse_key(config, "lock.max-timeout-secs", "a non-negative integer")?
                .or(defaults.lock.max_timeout_secs),
        };
        let spatial = SpatialConfig {
            geojson_max_precision: parse_key(
                config,
                "spatial.geojson-max-precision",
                "a non-negative integer",
            )?
            .unwrap_or(defaults.spatial.geojson_max_precision),
        };
        let level = match config.get("logging.level") {
            Some(raw) => raw
                .parse::<LogLevel>()
                .map_err(|e| EmberError::configuration_with_key(e, "logging.level"))?,
            None => defaults.logging.level,
        };

        let resolved = Self {
            lock,
            spatial,
            logging: LoggingConfig { level },
        };
        resolved.validate()?;
        Ok(resolved)
    }

    pub fn validate(&self) -> EmberResult<()> {
        if self.lock.wait_slice_ms == 0 {
            return Err(EmberError::configuration_with_key(
                "lock.wait-slice-ms must be greater than 0",
                "lock.wait-slice-ms",
            ));
        }
        if self.spatial.geojson_max_precision > MAX_PRECISION {
            return Err(EmberError::configuration_with_key(
                format!("spatial.geojson-max-precision cannot exceed {MAX_PRECISION}"),
                "spatial.geojson-max-precision",
            ));
        }
        Ok(())
    }
}
