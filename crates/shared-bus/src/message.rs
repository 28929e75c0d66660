//! # Broker Messages
//!
//! A message as stored and delivered by the broker, with its expiry window.

use std::time::{Duration, Instant};
use uuid::Uuid;

/// Message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text. The only kind the offload protocol produces.
    Text(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
}

impl Payload {
    /// Borrow the text body, if this is a text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    /// Short name of the payload kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// A message on a topic.
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    /// Broker-assigned identifier.
    pub id: Uuid,
    /// Topic the message was published to.
    pub topic: String,
    /// Message body.
    pub payload: Payload,
    /// When the broker accepted the message.
    pub published_at: Instant,
    /// Time-to-live. `None` never expires.
    pub ttl: Option<Duration>,
}

impl BrokerMessage {
    pub fn new(topic: impl Into<String>, payload: Payload, ttl: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            payload,
            published_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the message is past its time-to-live at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.published_at) >= ttl,
            None => false,
        }
    }
}
