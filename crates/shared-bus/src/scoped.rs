//! # Scoped Resources
//!
//! Guards that release a broker session or consumer when they go out of
//! scope, on success and error paths alike. A failure to release is logged
//! and never replaces the error that caused the early exit.

use crate::broker::{BrokerError, BrokerSession, MessageBroker, MessageConsumer};
use std::ops::{Deref, DerefMut};
use tracing::{debug, error};

/// A session that is closed on drop.
pub struct ScopedSession {
    inner: Box<dyn BrokerSession>,
    purpose: &'static str,
}

impl ScopedSession {
    /// Open a session on `broker`. `purpose` labels the session in logs.
    pub async fn open(
        broker: &dyn MessageBroker,
        purpose: &'static str,
    ) -> Result<Self, BrokerError> {
        let inner = broker.connect().await?;
        debug!(purpose, "Broker session opened");
        Ok(Self { inner, purpose })
    }

    /// Attach to a durable subscription; the consumer is detached on drop.
    pub async fn attach_durable(
        &mut self,
        topic: &str,
        name: &str,
    ) -> Result<ScopedConsumer, BrokerError> {
        let consumer = self.inner.attach_durable(topic, name).await?;
        Ok(ScopedConsumer::new(consumer, self.purpose))
    }

    /// Attach to a shared subscription; the consumer is detached on drop.
    pub async fn attach_shared(
        &mut self,
        topic: &str,
        share: &str,
    ) -> Result<ScopedConsumer, BrokerError> {
        let consumer = self.inner.attach_shared(topic, share).await?;
        Ok(ScopedConsumer::new(consumer, self.purpose))
    }
}

impl Deref for ScopedSession {
    type Target = dyn BrokerSession;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ScopedSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        match self.inner.close() {
            Ok(()) => debug!(purpose = self.purpose, "Broker session closed"),
            Err(e) => error!(purpose = self.purpose, error = %e, "Failed to close broker session"),
        }
    }
}

/// A consumer that is detached on drop.
pub struct ScopedConsumer {
    inner: Box<dyn MessageConsumer>,
    purpose: &'static str,
}

impl ScopedConsumer {
    fn new(inner: Box<dyn MessageConsumer>, purpose: &'static str) -> Self {
        Self { inner, purpose }
    }
}

impl Deref for ScopedConsumer {
    type Target = dyn MessageConsumer;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ScopedConsumer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ScopedConsumer {
    fn drop(&mut self) {
        if let Err(e) = self.inner.close() {
            error!(purpose = self.purpose, error = %e, "Failed to close consumer");
        }
    }
}
