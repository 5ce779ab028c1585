// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Layered engine properties
//!
//! Engine settings arrive as dotted keys (`lock.wait-slice-ms`) from several
//! places. Each value remembers where it came from, and a value from a
//! lower-priority source never replaces one from a higher-priority source.
//!
//! ## Property Sources (Priority: Low to High)
//!
//! 1. **RustDefault** - Built-in Rust defaults
//! 2. **ConfigFile** - TOML or YAML configuration file
//! 3. **Environment** - `EMBERSQL_<SECTION>_<KEY>` variables
//! 4. **CommandLine** - `--set key=value` overrides
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use embersql_rust::core::config::flat_config::*;
//!
//! let mut config = FlatConfig::new();
//! config.set("lock.wait-slice-ms", "100", PropertySource::RustDefault);
//! config.set("lock.wait-slice-ms", "25", PropertySource::CommandLine);
//! assert_eq!(config.get("lock.wait-slice-ms"), Some(&"25".to_string()));
//! ```

use std::collections::HashMap;

/// Prefix of environment variables read by [`FlatConfig::apply_env_vars`].
pub const ENV_PREFIX: &str = "EMBERSQL_";

/// Property source identifier with priority ordering
///
/// Higher priority sources override lower priority sources during configuration merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertySource {
    /// Rust code defaults (priority: 0)
    RustDefault,
    /// Configuration file (priority: 1)
    ConfigFile,
    /// Process environment (priority: 2)
    Environment,
    /// `--set key=value` command-line override (priority: 3)
    CommandLine,
}

impl PropertySource {
    /// Get numeric priority for comparison (higher = more important)
    #[inline]
    pub const fn priority(&self) -> u8 {
        match self {
            PropertySource::RustDefault => 0,
            PropertySource::ConfigFile => 1,
            PropertySource::Environment => 2,
            PropertySource::CommandLine => 3,
        }
    }

    #[inline]
    pub const fn description(&self) -> &'static str {
        match self {
            PropertySource::RustDefault => "Rust default",
            PropertySource::ConfigFile => "configuration file",
            PropertySource::Environment => "environment variable",
            PropertySource::CommandLine => "command line",
        }
    }
}

/// Flat key-value configuration with source tracking
#[derive(Debug, Clone, Default)]
pub struct FlatConfig {
    properties: HashMap<String, String>,
    sources: HashMap<String, PropertySource>,
}

impl FlatConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property unless a higher-priority source already set it. A
    /// source may overwrite its own earlier value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        source: PropertySource,
    ) {
        let key = key.into();
        if let Some(existing_source) = self.sources.get(&key) {
            if existing_source.priority() > source.priority() {
                return;
            }
        }
        self.properties.insert(key.clone(), value.into());
        self.sources.insert(key, source);
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }

    /// Get a property value with its source
    #[inline]
    pub fn get_with_source(&self, key: &str) -> Option<(&String, PropertySource)> {
        self.properties
            .get(key)
            .and_then(|value| self.sources.get(key).map(|source| (value, *source)))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    /// Merge another configuration into this one (respects priorities)
    pub fn merge(&mut self, other: &FlatConfig) {
        for (key, value) in &other.properties {
            if let Some(source) = other.sources.get(key) {
                self.set(key.clone(), value.clone(), *source);
            }
        }
    }

    /// Get all properties with a specific prefix, e.g. `"lock."`
    pub fn get_properties_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a String)> + 'a {
        self.properties
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
    }

    /// Flattens a parsed TOML document into dotted keys. Nested tables join
    /// with `.`; arrays are not valid engine properties and are skipped.
    pub fn set_toml_table(&mut self, prefix: &str, table: &toml::Table, source: PropertySource) {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                toml::Value::Table(nested) => self.set_toml_table(&full_key, nested, source),
                toml::Value::String(s) => self.set(full_key, s.clone(), source),
                toml::Value::Integer(i) => self.set(full_key, i.to_string(), source),
                toml::Value::Float(f) => self.set(full_key, f.to_string(), source),
                toml::Value::Boolean(b) => self.set(full_key, b.to_string(), source),
                toml::Value::Datetime(d) => self.set(full_key, d.to_string(), source),
                toml::Value::Array(_) => {
                    log::warn!("[Config] ignoring array value for '{}'", full_key);
                }
            }
        }
    }

    /// Applies `EMBERSQL_<SECTION>_<KEY>` variables: `EMBERSQL_LOCK_WAIT_SLICE_MS`
    /// becomes `lock.wait-slice-ms`.
    pub fn apply_env_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let rest = rest.to_ascii_lowercase();
            let Some((section, key)) = rest.split_once('_') else {
                continue;
            };
            if section.is_empty() || key.is_empty() {
                continue;
            }
            self.set(
                format!("{section}.{}", key.replace('_', "-")),
                value,
                PropertySource::Environment,
            );
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
