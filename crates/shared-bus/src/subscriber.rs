//! # Subscriptions
//!
//! Subscription queues held by the in-memory broker and the consumer handle
//! attached to them.

use crate::broker::{BrokerError, MessageConsumer};
use crate::memory::BrokerCore;
use crate::message::BrokerMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

/// How a subscription distributes messages to its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// Retained while detached; at most one consumer at a time.
    Durable,
    /// Competing consumers; each message goes to one of them.
    Shared,
}

/// Identity of a subscription within the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SubscriptionKey {
    pub topic: String,
    pub name: String,
    pub kind: SubscriptionKind,
}

impl SubscriptionKey {
    pub fn new(topic: &str, name: &str, kind: SubscriptionKind) -> Self {
        Self {
            topic: topic.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// Backlog of one subscription.
pub(crate) struct SubscriptionQueue {
    messages: VecDeque<BrokerMessage>,
    consumers: usize,
    notify: Arc<Notify>,
}

impl SubscriptionQueue {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            consumers: 0,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Enqueue `message`, first discarding expired messages at the head of
    /// the backlog so an unread queue does not grow without bound.
    ///
    /// Returns how many expired messages were discarded.
    pub fn push(&mut self, message: BrokerMessage) -> u64 {
        let now = Instant::now();
        let mut expired = 0;
        while self.messages.front().is_some_and(|m| m.is_expired_at(now)) {
            self.messages.pop_front();
            expired += 1;
        }
        self.messages.push_back(message);
        self.notify.notify_one();
        expired
    }

    /// Pop the oldest live message, discarding expired ones.
    ///
    /// Returns the message (if any) and how many expired messages were
    /// discarded on the way.
    pub fn pop_live(&mut self, now: Instant) -> (Option<BrokerMessage>, u64) {
        let mut expired = 0;
        while let Some(message) = self.messages.pop_front() {
            if message.is_expired_at(now) {
                expired += 1;
                continue;
            }
            return (Some(message), expired);
        }
        (None, expired)
    }

    /// Messages held, expired or not.
    pub fn stored_len(&self) -> usize {
        self.messages.len()
    }

    /// Live backlog size at `now`.
    pub fn live_len(&self, now: Instant) -> usize {
        self.messages.iter().filter(|m| !m.is_expired_at(now)).count()
    }

    pub fn consumers(&self) -> usize {
        self.consumers
    }

    pub fn add_consumer(&mut self) {
        self.consumers += 1;
    }

    pub fn remove_consumer(&mut self) {
        self.consumers = self.consumers.saturating_sub(1);
    }

    pub fn notify(&self) -> Arc<Notify> {
        self.notify.clone()
    }
}

/// A consumer attached to an in-memory subscription.
///
/// Detaches from the subscription when closed or dropped.
pub(crate) struct InMemoryConsumer {
    core: Arc<BrokerCore>,
    key: SubscriptionKey,
    notify: Arc<Notify>,
    started: Arc<AtomicBool>,
    open: bool,
}

impl InMemoryConsumer {
    pub fn new(
        core: Arc<BrokerCore>,
        key: SubscriptionKey,
        notify: Arc<Notify>,
        started: Arc<AtomicBool>,
    ) -> Self {
        Self {
            core,
            key,
            notify,
            started,
            open: true,
        }
    }

    fn detach(&mut self) {
        if self.open {
            self.open = false;
            self.core.detach(&self.key);
        }
    }
}

#[async_trait]
impl MessageConsumer for InMemoryConsumer {
    fn receive_no_wait(&mut self) -> Result<Option<BrokerMessage>, BrokerError> {
        if !self.open {
            return Err(BrokerError::NotConnected);
        }
        if !self.started.load(Ordering::Acquire) {
            return Ok(None);
        }
        self.core.take(&self.key)
    }

    async fn receive(&mut self) -> Result<BrokerMessage, BrokerError> {
        if !self.open {
            return Err(BrokerError::NotConnected);
        }
        if !self.started.load(Ordering::Acquire) {
            return Err(BrokerError::NotStarted);
        }
        loop {
            // Register interest before checking so a wake-up between the
            // check and the await is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.core.take(&self.key)? {
                return Ok(message);
            }
            notified.await;

            if !self.started.load(Ordering::Acquire) {
                return Err(BrokerError::NotConnected);
            }
        }
    }

    fn close(&mut self) -> Result<(), BrokerError> {
        self.detach();
        Ok(())
    }
}

impl Drop for InMemoryConsumer {
    fn drop(&mut self) {
        self.detach();
    }
}
