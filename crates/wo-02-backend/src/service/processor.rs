//! # Worker Processor
//!
//! Handles one work message: decode, transform, publish the result.
//!
//! Errors never reach the broker side: a message that cannot be processed is
//! logged and dropped, and the flow moves on to the next one.

use crate::config::WorkerConfig;
use crate::ports::WordTransform;
use shared_bus::{BrokerMessage, MessageBroker, Payload, ScopedSession};
use shared_types::{OffloadError, ResultItem, WorkItem};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Turns work messages into published results.
pub struct WorkerProcessor {
    broker: Arc<dyn MessageBroker>,
    transform: Arc<dyn WordTransform>,
    notification_topic: String,
    ttl: Duration,
    identity: String,
    simulated_work: Duration,
}

impl WorkerProcessor {
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        transform: Arc<dyn WordTransform>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            broker,
            transform,
            notification_topic: config.topics.notification_topic.clone(),
            ttl: config.topics.message_ttl(),
            identity: config.identity.clone(),
            simulated_work: config.simulated_work,
        }
    }

    /// Replace the tag stamped on results.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Process one message, logging and dropping it on failure.
    ///
    /// Returns the published result, if any.
    pub async fn process(&self, message: &BrokerMessage) -> Option<ResultItem> {
        match self.handle_message(message).await {
            Ok(result) => Some(result),
            Err(e @ OffloadError::MalformedMessage(_)) => {
                warn!(worker = %self.identity, message_id = %message.id, error = %e, "Dropping malformed work message");
                None
            }
            Err(e) => {
                error!(worker = %self.identity, message_id = %message.id, error = %e, "Failed to process work message");
                None
            }
        }
    }

    /// Process one message.
    ///
    /// # Errors
    ///
    /// - `MalformedMessage` - the payload is not text, or not a work item
    /// - `BrokerUnavailable` - no session could be opened for the result
    /// - `PublishFailed` - the broker rejected the result
    pub async fn handle_message(&self, message: &BrokerMessage) -> Result<ResultItem, OffloadError> {
        let text = message.payload.as_text().ok_or_else(|| {
            OffloadError::MalformedMessage(format!(
                "Invalid message type: {}",
                message.payload.kind()
            ))
        })?;
        let item = WorkItem::decode(text)?;
        debug!(worker = %self.identity, word = %item.word, frontend = %item.origin_tag, "Received work item");

        if !self.simulated_work.is_zero() {
            tokio::time::sleep(self.simulated_work).await;
        }

        let result = ResultItem::new(self.transform.apply(&item.word), self.identity.clone());
        self.publish(&result).await?;

        info!(
            worker = %self.identity,
            transform = self.transform.name(),
            word = %item.word,
            result = %result.transformed_word,
            "Published result"
        );
        Ok(result)
    }

    async fn publish(&self, result: &ResultItem) -> Result<(), OffloadError> {
        let body = result.encode()?;
        let mut session = ScopedSession::open(self.broker.as_ref(), "result")
            .await
            .map_err(|e| OffloadError::BrokerUnavailable(e.to_string()))?;
        session
            .publish(&self.notification_topic, Payload::Text(body), Some(self.ttl))
            .await
            .map_err(|e| OffloadError::PublishFailed {
                published: 0,
                reason: e.to_string(),
            })
    }
}
