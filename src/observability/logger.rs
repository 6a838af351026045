//! Logging setup
//!
//! One `tracing-subscriber` fmt layer filtered by `EnvFilter`, installed by the entry points.

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `level` wins over `RUST_LOG`; with neither, `info`
pub fn log_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| anyhow!("invalid log level '{}': {}", directives, e)),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))),
    }
}

pub fn init_logging(level: Option<&str>) -> Result<()> {
    tracing_subscriber::registry()
        .with(log_filter(level)?)
        .with(fmt::layer().with_timer(ChronoLocal::rfc_3339()).with_target(false))
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}
