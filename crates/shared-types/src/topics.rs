//! # Topic Configuration
//!
//! Names of the destinations both sides of the broker agree on, and the
//! message expiry policy.

use std::time::Duration;

/// Upper bound on message time-to-live. Stale work and stale results are
/// discarded by the broker after this long.
pub const MAX_MESSAGE_TTL: Duration = Duration::from_secs(60);

pub const DEFAULT_WORK_TOPIC: &str = "sample/words";
pub const DEFAULT_NOTIFICATION_TOPIC: &str = "sample/wordsuppercase";
pub const DEFAULT_SUBSCRIPTION_NAME: &str = "sample.subscription";
pub const DEFAULT_WORKER_SHARE: &str = "sample.workers";

/// Destinations and expiry shared by the front-end and the workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    /// Topic work items are published to.
    pub work_topic: String,
    /// Topic results are published to.
    pub notification_topic: String,
    /// Durable subscription the front-end reads results from.
    pub subscription_name: String,
    /// Shared subscription the workers consume work from.
    pub worker_share: String,
    /// Time-to-live applied to every published message.
    message_ttl: Duration,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            work_topic: DEFAULT_WORK_TOPIC.to_string(),
            notification_topic: DEFAULT_NOTIFICATION_TOPIC.to_string(),
            subscription_name: DEFAULT_SUBSCRIPTION_NAME.to_string(),
            worker_share: DEFAULT_WORKER_SHARE.to_string(),
            message_ttl: MAX_MESSAGE_TTL,
        }
    }
}

impl TopicConfig {
    /// Set the message TTL, capped at [`MAX_MESSAGE_TTL`].
    #[must_use]
    pub fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = ttl.min(MAX_MESSAGE_TTL);
        self
    }

    #[must_use]
    pub fn message_ttl(&self) -> Duration {
        self.message_ttl
    }
}
