//! # Broker Ports
//!
//! The traits a broker adapter implements. Shaped after a classic
//! connection → session → consumer model: a session is opened per operation,
//! consumers are attached through it, and delivery starts on `start()`.

use crate::message::{BrokerMessage, Payload};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a broker adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// The broker could not be reached.
    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    /// Another consumer is already attached to this durable subscription.
    #[error("Durable subscription '{name}' on '{topic}' already has an active consumer")]
    SubscriptionInUse { topic: String, name: String },

    /// The broker refused the publication.
    #[error("Publish to '{topic}' rejected: {reason}")]
    PublishRejected { topic: String, reason: String },

    /// The session or consumer has already been closed.
    #[error("Not connected")]
    NotConnected,

    /// Blocking receive on a session that was never started.
    #[error("Session not started")]
    NotStarted,

    /// The broker shut down while the operation was in progress.
    #[error("Broker closed")]
    Closed,

    /// Releasing a session or consumer failed.
    #[error("Close failed: {0}")]
    CloseFailed(String),
}

/// Entry point to a broker: hands out sessions.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Open a new session. Callers own it and must close it.
    async fn connect(&self) -> Result<Box<dyn BrokerSession>, BrokerError>;

    /// Human-readable identity of the broker connection, for logs.
    fn describe(&self) -> String;
}

/// A single-owner session with the broker.
#[async_trait]
pub trait BrokerSession: Send {
    /// Publish one message. `ttl` of `None` never expires.
    async fn publish(
        &mut self,
        topic: &str,
        payload: Payload,
        ttl: Option<Duration>,
    ) -> Result<(), BrokerError>;

    /// Attach to the durable subscription `name` on `topic`, creating it if
    /// absent. Fails with [`BrokerError::SubscriptionInUse`] if another
    /// consumer is attached.
    async fn attach_durable(
        &mut self,
        topic: &str,
        name: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError>;

    /// Attach a competing consumer to the shared subscription `share` on
    /// `topic`, creating it if absent.
    async fn attach_shared(
        &mut self,
        topic: &str,
        share: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError>;

    /// Begin delivery to consumers attached through this session.
    fn start(&mut self) -> Result<(), BrokerError>;

    /// Release the session. Idempotent.
    fn close(&mut self) -> Result<(), BrokerError>;
}

/// A consumer attached to a subscription.
#[async_trait]
pub trait MessageConsumer: Send {
    /// One non-blocking receive attempt.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(msg))` - a message was available
    /// - `Ok(None)` - nothing available, or the session is not started
    fn receive_no_wait(&mut self) -> Result<Option<BrokerMessage>, BrokerError>;

    /// Wait for the next message.
    async fn receive(&mut self) -> Result<BrokerMessage, BrokerError>;

    /// Detach from the subscription. Idempotent; the subscription itself
    /// (and any durable backlog) remains.
    fn close(&mut self) -> Result<(), BrokerError>;
}
