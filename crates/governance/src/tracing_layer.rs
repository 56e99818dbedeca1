//! Logging configuration.

use arkaios_core::{config::LoggingConfig, Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,arkaios=debug";

/// Pick the filter directive: `RUST_LOG`, then the configured filter, then the default.
fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| config.filter.clone())
        .unwrap_or_else(|| DEFAULT_FILTER.into())
}

/// Install the global subscriber: env filter plus plain or JSON stdout output.
pub fn configure_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter_directive(config))
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))
}
