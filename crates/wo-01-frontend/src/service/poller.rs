//! # Notification Poller
//!
//! Serves "is there a result yet?" calls with a single non-blocking receive
//! on the durable subscription.
//!
//! The whole attach → start → receive → detach sequence runs under the
//! [`SubscriptionGate`] lock. Two concurrent consumers on one durable
//! subscription name is a protocol violation, so concurrent polls queue
//! behind each other instead of running in parallel.

use crate::service::gate::SubscriptionGate;
use shared_bus::{BrokerError, BrokerMessage, MessageBroker, ScopedSession};
use shared_types::{OffloadError, ResultItem};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Reads one result at a time from the durable subscription.
pub struct NotificationPoller {
    broker: Arc<dyn MessageBroker>,
    gate: Arc<SubscriptionGate>,
}

impl NotificationPoller {
    pub fn new(broker: Arc<dyn MessageBroker>, gate: Arc<SubscriptionGate>) -> Self {
        Self { broker, gate }
    }

    /// Check once for a result.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(result))` - a result was waiting
    /// - `Ok(None)` - nothing available right now
    ///
    /// # Errors
    ///
    /// - `MalformedMessage` - a message was consumed but is not a result;
    ///   it cannot be replayed
    /// - `BrokerUnavailable` - the broker could not be reached
    /// - `SubscriptionInitFailed` - the subscription could not be created
    pub async fn poll_once(&self) -> Result<Option<ResultItem>, OffloadError> {
        let _exclusive = self.gate.exclusive().await?;

        let message = self.receive_one().await.map_err(|e| {
            error!(error = %e, "Exception checking for publications");
            OffloadError::BrokerUnavailable(e.to_string())
        })?;

        match message {
            Some(message) => parse_result(&message).map(Some),
            None => {
                debug!("No result available");
                Ok(None)
            }
        }
    }

    async fn receive_one(&self) -> Result<Option<BrokerMessage>, BrokerError> {
        let mut session = ScopedSession::open(self.broker.as_ref(), "poll").await?;
        let mut consumer = session
            .attach_durable(self.gate.topic(), self.gate.subscription())
            .await?;
        session.start()?;
        consumer.receive_no_wait()
    }
}

fn parse_result(message: &BrokerMessage) -> Result<ResultItem, OffloadError> {
    let text = message.payload.as_text().ok_or_else(|| {
        OffloadError::MalformedMessage(format!(
            "Invalid message type: {}",
            message.payload.kind()
        ))
    })?;
    let result = ResultItem::decode(text).inspect_err(|e| {
        error!(message_id = %message.id, error = %e, "Discarding malformed result");
    })?;
    info!(word = %result.transformed_word, backend = %result.worker_tag, "Received response");
    Ok(result)
}
