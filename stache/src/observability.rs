//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{Error, Result};

/// Initialize tracing from the configured log level
pub fn init_tracing(config: &Config) -> Result<()> {
    init_tracing_with_level(&config.log_level)
}

/// Initialize tracing with an explicit level or filter directive.
///
/// Logs go to stderr so that rendered output on stdout stays clean. An
/// invalid directive falls back to `info`. Fails if a global subscriber is
/// already installed.
pub fn init_tracing_with_level(log_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Internal(format!("failed to install tracing subscriber: {e}")))?;

    tracing::debug!(level = log_level, "tracing initialized");
    Ok(())
}
