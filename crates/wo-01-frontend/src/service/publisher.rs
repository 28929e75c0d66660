//! # Work Publisher
//!
//! Splits a request into words and publishes one work message per word.
//!
//! Publication is **not atomic**. If the broker fails midway, the words
//! before the failure stay enqueued and `PublishFailed.published` says how
//! many.

use crate::domain::split_request;
use crate::ports::PublishReceipt;
use crate::service::gate::SubscriptionGate;
use shared_bus::{BrokerError, MessageBroker, Payload, ScopedSession};
use shared_types::{OffloadError, TopicConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Publishes work items to the work topic.
pub struct WorkPublisher {
    broker: Arc<dyn MessageBroker>,
    gate: Arc<SubscriptionGate>,
    work_topic: String,
    ttl: Duration,
    identity: String,
}

impl WorkPublisher {
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        gate: Arc<SubscriptionGate>,
        topics: &TopicConfig,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            gate,
            work_topic: topics.work_topic.clone(),
            ttl: topics.message_ttl(),
            identity: identity.into(),
        }
    }

    /// Publish one work item per whitespace-separated word.
    pub async fn publish(&self, request_text: Option<&str>) -> Result<PublishReceipt, OffloadError> {
        let items = split_request(request_text, &self.identity)?;

        // Results for these items must have somewhere to land.
        self.gate.ensure_subscription().await?;

        if items.is_empty() {
            return Ok(PublishReceipt { item_count: 0 });
        }

        // Encoded up front so an encoding failure leaves nothing enqueued.
        let bodies = items
            .iter()
            .map(|item| item.encode())
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = ScopedSession::open(self.broker.as_ref(), "publish")
            .await
            .map_err(|e| {
                error!(error = %e, "Cannot connect to publish work");
                OffloadError::BrokerUnavailable(e.to_string())
            })?;

        for (published, body) in bodies.into_iter().enumerate() {
            debug!(topic = %self.work_topic, message = %body, "Sending message");
            session
                .publish(&self.work_topic, Payload::Text(body), Some(self.ttl))
                .await
                .map_err(|e| publish_failed(published, &e))?;
        }

        info!(
            topic = %self.work_topic,
            count = items.len(),
            "Published work items"
        );
        Ok(PublishReceipt {
            item_count: items.len(),
        })
    }
}

fn publish_failed(published: usize, cause: &BrokerError) -> OffloadError {
    error!(published, error = %cause, "Exception sending work message");
    OffloadError::PublishFailed {
        published,
        reason: cause.to_string(),
    }
}
