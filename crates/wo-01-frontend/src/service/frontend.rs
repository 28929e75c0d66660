//! # Frontend Service
//!
//! Wires the gate, publisher and poller of one front-end instance around a
//! single shared [`SubscriptionGate`].

use crate::config::FrontendConfig;
use crate::ports::{PublishReceipt, WorkFrontendApi};
use crate::service::{NotificationPoller, SubscriptionGate, WorkPublisher};
use async_trait::async_trait;
use shared_bus::MessageBroker;
use shared_types::{OffloadError, ResultItem};
use std::sync::Arc;
use tracing::info;

/// One front-end instance.
pub struct FrontendService {
    gate: Arc<SubscriptionGate>,
    publisher: WorkPublisher,
    poller: NotificationPoller,
}

impl FrontendService {
    pub fn new(broker: Arc<dyn MessageBroker>, config: &FrontendConfig) -> Self {
        info!(
            broker = %broker.describe(),
            identity = %config.identity,
            work_topic = %config.topics.work_topic,
            notification_topic = %config.topics.notification_topic,
            "Initialising front-end"
        );

        let gate = Arc::new(SubscriptionGate::new(Arc::clone(&broker), &config.topics));
        let publisher = WorkPublisher::new(
            Arc::clone(&broker),
            Arc::clone(&gate),
            &config.topics,
            config.identity.clone(),
        );
        let poller = NotificationPoller::new(broker, Arc::clone(&gate));

        Self {
            gate,
            publisher,
            poller,
        }
    }

    /// The gate shared by publisher and poller.
    pub fn gate(&self) -> &Arc<SubscriptionGate> {
        &self.gate
    }
}

#[async_trait]
impl WorkFrontendApi for FrontendService {
    async fn submit(&self, words: Option<&str>) -> Result<PublishReceipt, OffloadError> {
        self.publisher.publish(words).await
    }

    async fn poll(&self) -> Result<Option<ResultItem>, OffloadError> {
        self.poller.poll_once().await
    }
}
