//! Worker configuration.

use shared_types::TopicConfig;
use std::time::Duration;
use uuid::Uuid;

/// Default pause before a flow reconnects after a broker failure.
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration shared by the workers of one process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub topics: TopicConfig,
    /// Prefix of the tag stamped on every result; each flow appends its index.
    pub identity: String,
    /// Artificial delay per message, standing in for long-running work.
    pub simulated_work: Duration,
    pub reconnect_backoff: Duration,
}

impl WorkerConfig {
    pub fn new(topics: TopicConfig) -> Self {
        Self {
            topics,
            identity: format!("worker:{}", Uuid::new_v4().simple()),
            simulated_work: Duration::ZERO,
            reconnect_backoff: DEFAULT_RECONNECT_BACKOFF,
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    #[must_use]
    pub fn with_simulated_work(mut self, delay: Duration) -> Self {
        self.simulated_work = delay;
        self
    }

    #[must_use]
    pub fn with_reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new(TopicConfig::default())
    }
}
