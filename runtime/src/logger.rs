//! Logging setup for the `log` facade, backed by `env_logger`.
//!
//! Stdout carries the shell transcript, so diagnostics only ever go to stderr.

use log::{LevelFilter, SetLoggerError};
use std::str::FromStr;

/// Environment variable overriding the configured log level.
pub const LOG_ENV: &str = "KUBSH_LOG";

/// Install the stderr logger at `level`.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init()
}

/// Pick the level from `$KUBSH_LOG`, then the config value, then `warn`.
pub fn level_from(env: Option<&str>, configured: &str) -> LevelFilter {
    env.and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .or_else(|| LevelFilter::from_str(configured.trim()).ok())
        .unwrap_or(LevelFilter::Warn)
}
