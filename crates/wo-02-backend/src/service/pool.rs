//! # Worker Pool
//!
//! Runs N independent processing flows. Each flow owns its own session and
//! consumer on the shared work subscription, so the broker spreads work
//! items across flows.
//!
//! A flow survives broker failures: it logs, waits `reconnect_backoff` and
//! attaches again. Flows stop when [`WorkerPool::shutdown`] is called, but
//! only between messages: a message taken from the queue is always
//! processed and counted.

use crate::config::WorkerConfig;
use crate::ports::WordTransform;
use crate::service::processor::WorkerProcessor;
use shared_bus::{BrokerError, MessageBroker, ScopedSession};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to a set of running worker flows.
pub struct WorkerPool {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

/// Counters shared by all flows of a pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    processed: AtomicU64,
    dropped: AtomicU64,
    reconnects: AtomicU64,
}

impl PoolStats {
    /// Messages turned into a published result.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Messages logged and discarded.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Times a flow lost its consumer and had to attach again.
    pub fn reconnects(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

struct Flow {
    processor: WorkerProcessor,
    broker: Arc<dyn MessageBroker>,
    work_topic: String,
    share: String,
    backoff: Duration,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Create the shared work subscription, then spawn the flows.
    ///
    /// Work published once this returns is retained for the pool even if no
    /// flow has attached yet.
    ///
    /// # Errors
    ///
    /// The broker error if the subscription could not be created; no flow
    /// is spawned in that case.
    pub async fn start(
        broker: Arc<dyn MessageBroker>,
        transform: Arc<dyn WordTransform>,
        config: &WorkerConfig,
        workers: usize,
    ) -> Result<Self, BrokerError> {
        if workers > 0 {
            let mut session = ScopedSession::open(broker.as_ref(), "worker-init").await?;
            let consumer = session
                .attach_shared(&config.topics.work_topic, &config.topics.worker_share)
                .await?;
            drop(consumer);
        }
        Ok(Self::spawn(broker, transform, config, workers))
    }

    /// Spawn `workers` flows onto the current tokio runtime.
    ///
    /// The work subscription appears when the first flow attaches; use
    /// [`start`](Self::start) when work may be published immediately.
    pub fn spawn(
        broker: Arc<dyn MessageBroker>,
        transform: Arc<dyn WordTransform>,
        config: &WorkerConfig,
        workers: usize,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(PoolStats::default());

        let handles = (0..workers)
            .map(|index| {
                let processor =
                    WorkerProcessor::new(Arc::clone(&broker), Arc::clone(&transform), config)
                        .with_identity(format!("{}-{index}", config.identity));
                let flow = Flow {
                    processor,
                    broker: Arc::clone(&broker),
                    work_topic: config.topics.work_topic.clone(),
                    share: config.topics.worker_share.clone(),
                    backoff: config.reconnect_backoff,
                    stats: Arc::clone(&stats),
                };
                tokio::spawn(flow.run(shutdown_rx.clone()))
            })
            .collect();

        info!(
            workers,
            topic = %config.topics.work_topic,
            share = %config.topics.worker_share,
            transform = transform.name(),
            "Worker pool started"
        );

        Self {
            shutdown_tx,
            handles,
            stats,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    /// Signal every flow to stop and wait for them to finish.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(true).is_err() {
            warn!("All worker flows already stopped");
        }
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker flow panicked");
            }
        }
        info!("Worker pool stopped");
    }
}

impl Flow {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let worker = self.processor.identity().to_string();
        info!(worker = %worker, "Worker flow started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.consume(&mut shutdown).await {
                Ok(()) => break,
                Err(e) => {
                    error!(worker = %worker, error = %e, "Consumer failed, reconnecting");
                    self.stats.reconnects.fetch_add(1, Ordering::Relaxed);
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(self.backoff) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(worker = %worker, "Worker flow stopped");
    }

    /// Attach to the work subscription and process until shutdown (`Ok`) or
    /// a broker failure (`Err`).
    async fn consume(&self, shutdown: &mut watch::Receiver<bool>) -> Result<(), BrokerError> {
        let mut session = ScopedSession::open(self.broker.as_ref(), "worker").await?;
        let mut consumer = session.attach_shared(&self.work_topic, &self.share).await?;
        session.start()?;

        loop {
            // Shutdown is only observed while waiting; processing is never cut short.
            let message = tokio::select! {
                received = consumer.receive() => received?,
                _ = shutdown.changed() => return Ok(()),
            };
            let counter = match self.processor.process(&message).await {
                Some(_) => &self.stats.processed,
                None => &self.stats.dropped,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}
