//! # Social Graph Runtime
//!
//! Entry point: telemetry, configuration, services, trigger router, then
//! wait for Ctrl+C.

use anyhow::{Context, Result};
use sg_runtime::{RuntimeConfig, ServiceContainer, SocialGraphRuntime};
use sg_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    let _guard = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Failed to load runtime configuration")?;
    let services = ServiceContainer::new(config).context("Failed to build services")?;

    let runtime = SocialGraphRuntime::new(services);
    runtime.start().await?;

    info!(service = %telemetry.service_name, "Social graph is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;

    if telemetry.metrics_enabled {
        match encode_metrics() {
            Ok(text) => debug!(metrics = %text, "Final metrics snapshot"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        }
    }
    Ok(())
}
