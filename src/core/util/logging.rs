// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::config::engine_config::LoggingConfig;

/// Environment variable that overrides the configured filter, using
/// `env_logger` directive syntax.
pub const LOG_ENV_VAR: &str = "EMBERSQL_LOG";

/// Installs `env_logger` as the `log` backend. Later calls are no-ops, so
/// tests and embedders can call this freely.
pub fn init_logging(config: &LoggingConfig) {
    let env = env_logger::Env::default().filter_or(LOG_ENV_VAR, config.level.as_str());
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
    {
        log::debug!("[Logging] initialized at level '{}'", config.level.as_str());
    }
}
