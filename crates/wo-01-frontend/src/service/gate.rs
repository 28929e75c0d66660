//! # Subscription Gate
//!
//! Owns the durable result subscription on behalf of one front-end process.
//!
//! The subscription must exist before the first work item is published:
//! the broker does not retain publications for subscriptions created later,
//! so results from an early worker would otherwise be lost.
//!
//! The gate lock serializes two things:
//!
//! 1. creation of the subscription (at most once, double-checked), and
//! 2. every poll, because the broker admits a single consumer per durable
//!    subscription name.

use shared_bus::{BrokerError, MessageBroker, ScopedSession};
use shared_types::{OffloadError, TopicConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info};

/// Lazily creates the durable subscription and guards access to it.
pub struct SubscriptionGate {
    broker: Arc<dyn MessageBroker>,
    topic: String,
    subscription: String,
    initialized: AtomicBool,
    lock: Mutex<()>,
}

/// Proof of exclusive access to the durable subscription.
///
/// Held for the duration of a poll; the subscription is guaranteed to exist
/// while it is alive.
pub struct GateGuard<'a> {
    _held: MutexGuard<'a, ()>,
}

impl SubscriptionGate {
    pub fn new(broker: Arc<dyn MessageBroker>, topics: &TopicConfig) -> Self {
        Self {
            broker,
            topic: topics.notification_topic.clone(),
            subscription: topics.subscription_name.clone(),
            initialized: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Make sure the durable subscription exists.
    ///
    /// Returns immediately once initialised; otherwise creates the
    /// subscription under the gate lock.
    ///
    /// # Errors
    ///
    /// `SubscriptionInitFailed` if the broker could not create it. The gate
    /// stays uninitialised and the next call retries.
    pub async fn ensure_subscription(&self) -> Result<(), OffloadError> {
        if self.is_initialized() {
            return Ok(());
        }
        self.exclusive().await.map(drop)
    }

    /// Acquire the gate lock, creating the subscription first if needed.
    pub async fn exclusive(&self) -> Result<GateGuard<'_>, OffloadError> {
        let held = self.lock.lock().await;
        if !self.initialized.load(Ordering::Acquire) {
            self.initialize().await.map_err(|e| {
                error!(
                    topic = %self.topic,
                    subscription = %self.subscription,
                    error = %e,
                    "Failed to initialise subscription"
                );
                OffloadError::SubscriptionInitFailed(e.to_string())
            })?;
            self.initialized.store(true, Ordering::Release);
            info!(
                topic = %self.topic,
                subscription = %self.subscription,
                "Subscription correctly initialised"
            );
        }
        Ok(GateGuard { _held: held })
    }

    /// Attach to the subscription (creating it) and detach without consuming.
    async fn initialize(&self) -> Result<(), BrokerError> {
        let mut session = ScopedSession::open(self.broker.as_ref(), "subscription-init").await?;
        let consumer = session.attach_durable(&self.topic, &self.subscription).await?;
        drop(consumer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{InMemoryBroker, SubscriptionKind};

    fn gate(broker: &InMemoryBroker) -> SubscriptionGate {
        SubscriptionGate::new(Arc::new(broker.clone()), &TopicConfig::default())
    }

    #[tokio::test]
    async fn test_creates_subscription_once() {
        let broker = InMemoryBroker::new();
        let gate = gate(&broker);

        gate.ensure_subscription().await.unwrap();
        gate.ensure_subscription().await.unwrap();

        assert!(gate.is_initialized());
        assert_eq!(broker.stats().durable_attaches(), 1);
        assert_eq!(
            broker.backlog(gate.topic(), gate.subscription(), SubscriptionKind::Durable),
            Some(0)
        );
        // Nothing left attached or open.
        assert_eq!(broker.stats().active_durable_consumers(), 0);
        assert_eq!(broker.stats().open_sessions(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ensure_attaches_at_most_once() {
        let broker = InMemoryBroker::new();
        let gate = Arc::new(gate(&broker));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move { gate.ensure_subscription().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(broker.stats().durable_attaches(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_gate_unset_and_retries() {
        let broker = InMemoryBroker::new();
        let gate = gate(&broker);

        broker.set_available(false);
        let err = gate.ensure_subscription().await.unwrap_err();
        assert!(matches!(err, OffloadError::SubscriptionInitFailed(_)));
        assert!(!gate.is_initialized());

        broker.set_available(true);
        gate.ensure_subscription().await.unwrap();
        assert!(gate.is_initialized());
    }

    #[tokio::test]
    async fn test_subscription_in_use_is_reported() {
        let broker = InMemoryBroker::new();
        let gate = gate(&broker);

        // Another instance currently holds the durable subscription.
        let mut other = broker.connect().await.unwrap();
        let _held = other
            .attach_durable(gate.topic(), gate.subscription())
            .await
            .unwrap();

        let err = gate.ensure_subscription().await.unwrap_err();
        assert!(matches!(err, OffloadError::SubscriptionInitFailed(ref m) if m.contains("active consumer")));
    }

    #[tokio::test]
    async fn test_exclusive_initialises() {
        let broker = InMemoryBroker::new();
        let gate = gate(&broker);
        {
            let _guard = gate.exclusive().await.unwrap();
            assert!(gate.is_initialized());
        }
        assert_eq!(broker.stats().durable_attaches(), 1);
    }
}
