//! # Worker Offload Node
//!
//! Runs one front-end and a pool of workers against a single broker.
//!
//! ## Layout
//!
//! ```text
//!            HTTP :3000
//!                │
//!        ┌───────▼────────┐         ┌────────────────┐
//!        │ FrontendService│         │  WorkerPool    │
//!        │  (wo-01)       │         │  (wo-02) x N   │
//!        └───┬────────▲───┘         └───▲────────┬───┘
//!   work topic│        │notification     │work    │notification
//!            ▼        │ (durable)       │(shared)▼
//!        ┌────────────┴──────────────────┴─────────────┐
//!        │                InMemoryBroker               │
//!        └─────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load and validate configuration
//! 3. Create the broker and the front-end
//! 4. Spawn the worker pool
//! 5. Bind and serve HTTP
//! 6. Wait for Ctrl+C, then shut down in reverse order

pub mod container;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use shared_bus::{InMemoryBroker, MessageBroker};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};
use wo_01_frontend::{FrontendConfig, FrontendService};
use wo_02_backend::{Uppercase, WorkerConfig, WorkerPool};

use crate::container::NodeConfig;

/// The node runtime owning every component.
pub struct NodeRuntime {
    config: NodeConfig,
    broker: InMemoryBroker,
    frontend: Arc<FrontendService>,
    workers: Option<WorkerPool>,
    http: Option<JoinHandle<std::io::Result<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Create the broker and front-end. Nothing runs until
    /// [`start_workers`](Self::start_workers) / [`start_http`](Self::start_http).
    pub fn new(config: NodeConfig) -> Self {
        info!(broker = %config.broker.service, "Creating worker offload node");

        let broker = InMemoryBroker::with_service(config.broker.service.clone());
        let frontend = Arc::new(FrontendService::new(
            Arc::new(broker.clone()),
            &FrontendConfig::new(config.topics.clone()),
        ));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            broker,
            frontend,
            workers: None,
            http: None,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn broker(&self) -> &InMemoryBroker {
        &self.broker
    }

    pub fn frontend(&self) -> Arc<FrontendService> {
        Arc::clone(&self.frontend)
    }

    /// Spawn the configured number of worker flows.
    ///
    /// Work submitted once this returns is held for the pool.
    pub async fn start_workers(&mut self) -> Result<()> {
        let count = self.config.workers.count;
        if count == 0 {
            info!("Worker pool disabled");
            return Ok(());
        }
        let config = WorkerConfig::new(self.config.topics.clone())
            .with_simulated_work(self.config.workers.simulated_work);
        let broker: Arc<dyn MessageBroker> = Arc::new(self.broker.clone());
        let pool = WorkerPool::start(broker, Arc::new(Uppercase), &config, count)
            .await
            .context("Failed to create the worker subscription")?;
        self.workers = Some(pool);
        Ok(())
    }

    /// Bind the REST port and serve in the background.
    ///
    /// Returns the bound address.
    pub async fn start_http(&mut self) -> Result<SocketAddr> {
        let bind = format!("{}:{}", self.config.http.host, self.config.http.port);
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {bind}"))?;
        let addr = listener
            .local_addr()
            .context("Failed to read HTTP listener address")?;

        let api = Arc::clone(&self.frontend) as Arc<dyn wo_01_frontend::WorkFrontendApi>;
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        self.http = Some(tokio::spawn(wo_01_frontend::serve(
            listener,
            api,
            async move {
                let _ = shutdown_rx.changed().await;
                info!("HTTP server shutdown signal received");
            },
        )));

        Ok(addr)
    }

    /// Shut the node down gracefully.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Stop accepting HTTP requests and drain in-flight ones
    /// 2. Stop the worker flows
    /// 3. Shut the broker down
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        if let Some(http) = self.http.take() {
            match http.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
                Err(e) => error!(error = %e, "HTTP server task panicked"),
            }
        }
        if let Some(workers) = self.workers.take() {
            workers.shutdown().await;
        }
        self.broker.shutdown();

        info!("Shutdown complete");
    }
}
