#![deny(unused)]
//! Arkaios - tiered key-value persistence service.
//!
//! Serves the autopilot flag, the per-user API-key vault and the backend
//! health probe over HTTP, persisting to REST-KV or Redis with a local
//! filesystem backstop.

use arkaios_core::config::AppConfig;
use arkaios_gateway::GatewayServer;
use arkaios_store::{select_backends, BackendAvailability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    arkaios_governance::configure_tracing(&config.logging)?;
    tracing::info!("Starting Arkaios v{}", env!("CARGO_PKG_VERSION"));

    // Selection is repeated on every request; this is only a startup report.
    let availability = BackendAvailability::detect(&config.store).await;
    let plan = select_backends(&availability);
    if plan.is_empty() {
        tracing::warn!("No storage backend available; writes will fail until one is configured");
    } else {
        tracing::info!(
            primary = ?plan.primary(),
            tiers = ?plan.tiers(),
            "Storage backends detected"
        );
    }

    let mut server = GatewayServer::from_app_config(&config);
    if config.metrics.enabled {
        let handle = arkaios_governance::setup_metrics_recorder()?;
        server = server.with_metrics(handle);
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        env = ?config.deployment.env,
        "Gateway initialized"
    );

    server.run().await?;
    Ok(())
}
