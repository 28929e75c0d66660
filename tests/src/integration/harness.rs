//! Shared fixture: one broker, one front-end, a worker pool.

use shared_bus::{InMemoryBroker, MessageBroker};
use shared_types::{ResultItem, TopicConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use wo_01_frontend::{FrontendConfig, FrontendService, WorkFrontendApi};
use wo_02_backend::{Uppercase, WorkerConfig, WorkerPool};

pub struct Deployment {
    pub broker: InMemoryBroker,
    pub topics: TopicConfig,
    pub frontend: Arc<FrontendService>,
    pub workers: WorkerPool,
}

impl Deployment {
    pub async fn start(workers: usize) -> Self {
        Self::start_with(TopicConfig::default(), workers).await
    }

    pub async fn start_with(topics: TopicConfig, workers: usize) -> Self {
        let broker = InMemoryBroker::new();
        let shared: Arc<dyn MessageBroker> = Arc::new(broker.clone());

        let frontend = Arc::new(FrontendService::new(
            Arc::clone(&shared),
            &FrontendConfig::new(topics.clone()).with_identity("fe-it"),
        ));
        let worker_config = WorkerConfig::new(topics.clone())
            .with_identity("be-it")
            .with_reconnect_backoff(Duration::from_millis(20));
        let workers = WorkerPool::start(shared, Arc::new(Uppercase), &worker_config, workers)
            .await
            .expect("worker subscription");

        Self {
            broker,
            topics,
            frontend,
            workers,
        }
    }

    /// Wait until the pool has published `count` results.
    pub async fn wait_processed(&self, count: u64) {
        let stats = Arc::clone(self.workers.stats());
        timeout(Duration::from_secs(2), async move {
            while stats.processed() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("workers did not finish");
    }

    /// Poll until `count` results were returned.
    pub async fn collect(&self, count: usize) -> Vec<ResultItem> {
        let frontend = Arc::clone(&self.frontend);
        timeout(Duration::from_secs(2), async move {
            let mut results = Vec::new();
            while results.len() < count {
                match frontend.poll().await.expect("poll failed") {
                    Some(result) => results.push(result),
                    None => tokio::time::sleep(Duration::from_millis(5)).await,
                }
            }
            results
        })
        .await
        .expect("results did not arrive")
    }

    pub async fn stop(self) {
        self.workers.shutdown().await;
        self.broker.shutdown();
    }
}
