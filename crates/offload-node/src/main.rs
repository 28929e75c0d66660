//! # Worker Offload Node
//!
//! Entry point: telemetry, configuration, components, then wait for Ctrl+C.

use anyhow::{Context, Result};
use offload_node::container::load_config;
use offload_node::NodeRuntime;
use offload_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(&TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = load_config();
    config.validate().context("Invalid configuration")?;

    let mut runtime = NodeRuntime::new(config);
    runtime.start_workers().await?;
    let addr = runtime.start_http().await?;

    info!(%addr, "Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
