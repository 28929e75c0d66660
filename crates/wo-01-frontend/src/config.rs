//! Front-end configuration.

use shared_types::TopicConfig;
use uuid::Uuid;

/// Configuration for one front-end instance.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Destinations and expiry policy.
    pub topics: TopicConfig,
    /// Tag stamped on every published work item.
    pub identity: String,
}

impl FrontendConfig {
    pub fn new(topics: TopicConfig) -> Self {
        Self {
            topics,
            identity: generated_identity(),
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self::new(TopicConfig::default())
    }
}

fn generated_identity() -> String {
    format!("frontend:{}", Uuid::new_v4().simple())
}
