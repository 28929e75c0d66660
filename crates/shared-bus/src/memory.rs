//! # In-Memory Broker
//!
//! Single-process implementation of the broker ports. Suitable for a node
//! that runs its front-end and workers together and for tests; a deployment
//! with several front-end instances would plug a networked broker in behind
//! the same traits.
//!
//! Besides the broker semantics it offers fault injection (unavailability,
//! publish rejection, close failures) and counters that tests use to observe
//! protocol properties.

use crate::broker::{BrokerError, BrokerSession, MessageBroker, MessageConsumer};
use crate::message::{BrokerMessage, Payload};
use crate::subscriber::{InMemoryConsumer, SubscriptionKey, SubscriptionKind, SubscriptionQueue};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default connection identity reported by [`MessageBroker::describe`].
pub const DEFAULT_SERVICE: &str = "in-memory://local";

/// Counters describing broker activity.
#[derive(Debug, Default)]
pub struct BrokerStats {
    published: AtomicU64,
    delivered: AtomicU64,
    unrouted: AtomicU64,
    expired: AtomicU64,
    durable_attaches: AtomicU64,
    active_durable: AtomicUsize,
    peak_durable: AtomicUsize,
    open_sessions: AtomicUsize,
}

impl BrokerStats {
    /// Messages accepted by `publish`.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Messages handed to a consumer.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Messages accepted on a topic that had no subscription.
    pub fn unrouted(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    /// Messages discarded because their TTL elapsed.
    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    /// Successful attaches to any durable subscription.
    pub fn durable_attaches(&self) -> u64 {
        self.durable_attaches.load(Ordering::Relaxed)
    }

    /// Durable consumers currently attached.
    pub fn active_durable_consumers(&self) -> usize {
        self.active_durable.load(Ordering::SeqCst)
    }

    /// Highest number of durable consumers ever attached at once.
    pub fn peak_durable_consumers(&self) -> usize {
        self.peak_durable.load(Ordering::SeqCst)
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    fail_close: AtomicBool,
    /// Remaining publishes before the broker starts rejecting. `None` is
    /// unlimited.
    publish_budget: Mutex<Option<usize>>,
}

#[derive(Default)]
struct BrokerState {
    subscriptions: HashMap<SubscriptionKey, SubscriptionQueue>,
    closed: bool,
}

/// State shared by the broker handle, its sessions and consumers.
pub(crate) struct BrokerCore {
    service: String,
    state: Mutex<BrokerState>,
    stats: BrokerStats,
    faults: Faults,
}

impl BrokerCore {
    fn publish(
        &self,
        topic: &str,
        payload: Payload,
        ttl: Option<Duration>,
    ) -> Result<(), BrokerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }

        let message = BrokerMessage::new(topic, payload, ttl);
        let mut routed = 0usize;
        let mut expired = 0u64;
        for (key, queue) in state.subscriptions.iter_mut() {
            if key.topic == topic {
                expired += queue.push(message.clone());
                routed += 1;
            }
        }

        self.stats.published.fetch_add(1, Ordering::Relaxed);
        if expired > 0 {
            self.stats.expired.fetch_add(expired, Ordering::Relaxed);
        }
        if routed == 0 {
            self.stats.unrouted.fetch_add(1, Ordering::Relaxed);
            warn!(topic, message_id = %message.id, "Message dropped (no subscriptions)");
        } else {
            debug!(topic, message_id = %message.id, subscriptions = routed, "Message published");
        }
        Ok(())
    }

    fn attach(
        self: &Arc<Self>,
        key: SubscriptionKey,
        started: Arc<AtomicBool>,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }

        let queue = state
            .subscriptions
            .entry(key.clone())
            .or_insert_with(|| {
                info!(topic = %key.topic, name = %key.name, kind = ?key.kind, "Subscription created");
                SubscriptionQueue::new()
            });

        if key.kind == SubscriptionKind::Durable {
            if queue.consumers() > 0 {
                return Err(BrokerError::SubscriptionInUse {
                    topic: key.topic,
                    name: key.name,
                });
            }
            self.stats.durable_attaches.fetch_add(1, Ordering::Relaxed);
            let active = self.stats.active_durable.fetch_add(1, Ordering::SeqCst) + 1;
            self.stats.peak_durable.fetch_max(active, Ordering::SeqCst);
        }
        queue.add_consumer();
        let notify = queue.notify();
        drop(state);

        debug!(topic = %key.topic, name = %key.name, kind = ?key.kind, "Consumer attached");
        Ok(Box::new(InMemoryConsumer::new(
            Arc::clone(self),
            key,
            notify,
            started,
        )))
    }

    pub(crate) fn detach(&self, key: &SubscriptionKey) {
        let mut state = self.state.lock();
        if let Some(queue) = state.subscriptions.get_mut(key) {
            queue.remove_consumer();
        }
        if key.kind == SubscriptionKind::Durable {
            self.stats.active_durable.fetch_sub(1, Ordering::SeqCst);
        }
        debug!(topic = %key.topic, name = %key.name, "Consumer detached");
    }

    pub(crate) fn take(&self, key: &SubscriptionKey) -> Result<Option<BrokerMessage>, BrokerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }
        let Some(queue) = state.subscriptions.get_mut(key) else {
            return Ok(None);
        };

        let (message, expired) = queue.pop_live(Instant::now());
        if expired > 0 {
            self.stats.expired.fetch_add(expired, Ordering::Relaxed);
            debug!(topic = %key.topic, name = %key.name, expired, "Discarded expired messages");
        }
        if message.is_some() {
            self.stats.delivered.fetch_add(1, Ordering::Relaxed);
        }
        Ok(message)
    }
}

/// In-process message broker.
///
/// Cloning yields another handle to the same broker.
#[derive(Clone)]
pub struct InMemoryBroker {
    core: Arc<BrokerCore>,
}

impl InMemoryBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Create a broker reporting `service` as its connection identity.
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            core: Arc::new(BrokerCore {
                service: service.into(),
                state: Mutex::new(BrokerState::default()),
                stats: BrokerStats::default(),
                faults: Faults::default(),
            }),
        }
    }

    pub fn stats(&self) -> &BrokerStats {
        &self.core.stats
    }

    /// Live messages waiting in a subscription, or `None` if it does not
    /// exist.
    pub fn backlog(&self, topic: &str, name: &str, kind: SubscriptionKind) -> Option<usize> {
        let state = self.core.state.lock();
        state
            .subscriptions
            .get(&SubscriptionKey::new(topic, name, kind))
            .map(|queue| queue.live_len(Instant::now()))
    }

    /// Simulate an outage: while unavailable, `connect` fails.
    pub fn set_available(&self, available: bool) {
        self.core.faults.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Accept `count` more publications, then reject every one after.
    pub fn fail_publishes_after(&self, count: usize) {
        *self.core.faults.publish_budget.lock() = Some(count);
    }

    /// Make session `close` report failure (the session is still released).
    pub fn fail_close(&self, fail: bool) {
        self.core.faults.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Shut the broker down, waking every blocked consumer with
    /// [`BrokerError::Closed`].
    pub fn shutdown(&self) {
        let mut state = self.core.state.lock();
        state.closed = true;
        for queue in state.subscriptions.values() {
            queue.notify().notify_waiters();
        }
        info!(service = %self.core.service, "Broker shut down");
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn connect(&self) -> Result<Box<dyn BrokerSession>, BrokerError> {
        if self.core.faults.unavailable.load(Ordering::SeqCst) {
            return Err(BrokerError::Unavailable(format!(
                "{} is not reachable",
                self.core.service
            )));
        }
        if self.core.state.lock().closed {
            return Err(BrokerError::Unavailable(format!(
                "{} has shut down",
                self.core.service
            )));
        }

        self.core.stats.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemorySession {
            core: Arc::clone(&self.core),
            started: Arc::new(AtomicBool::new(false)),
            open: true,
        }))
    }

    fn describe(&self) -> String {
        self.core.service.clone()
    }
}

/// Session on an [`InMemoryBroker`].
struct InMemorySession {
    core: Arc<BrokerCore>,
    started: Arc<AtomicBool>,
    open: bool,
}

impl InMemorySession {
    fn ensure_open(&self) -> Result<(), BrokerError> {
        if self.open {
            Ok(())
        } else {
            Err(BrokerError::NotConnected)
        }
    }

    fn release(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.started.store(false, Ordering::Release);
        self.core.stats.open_sessions.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

#[async_trait]
impl BrokerSession for InMemorySession {
    async fn publish(
        &mut self,
        topic: &str,
        payload: Payload,
        ttl: Option<Duration>,
    ) -> Result<(), BrokerError> {
        self.ensure_open()?;
        {
            let mut budget = self.core.faults.publish_budget.lock();
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(BrokerError::PublishRejected {
                        topic: topic.to_string(),
                        reason: "broker refused the message".to_string(),
                    });
                }
                *remaining -= 1;
            }
        }
        self.core.publish(topic, payload, ttl)
    }

    async fn attach_durable(
        &mut self,
        topic: &str,
        name: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.ensure_open()?;
        self.core.attach(
            SubscriptionKey::new(topic, name, SubscriptionKind::Durable),
            Arc::clone(&self.started),
        )
    }

    async fn attach_shared(
        &mut self,
        topic: &str,
        share: &str,
    ) -> Result<Box<dyn MessageConsumer>, BrokerError> {
        self.ensure_open()?;
        self.core.attach(
            SubscriptionKey::new(topic, share, SubscriptionKind::Shared),
            Arc::clone(&self.started),
        )
    }

    fn start(&mut self) -> Result<(), BrokerError> {
        self.ensure_open()?;
        self.started.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BrokerError> {
        if self.release() && self.core.faults.fail_close.load(Ordering::SeqCst) {
            return Err(BrokerError::CloseFailed("connection reset during close".to_string()));
        }
        Ok(())
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.release();
    }
}
