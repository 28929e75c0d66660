//! # Node Configuration
//!
//! Unified configuration for the broker connection, topics, REST surface
//! and worker pool.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WO_BROKER_SERVICE` | `amqp://localhost:5672` |
//! | `WO_WORK_TOPIC` | `sample/words` |
//! | `WO_NOTIFICATION_TOPIC` | `sample/wordsuppercase` |
//! | `WO_SUBSCRIPTION_NAME` | `sample.subscription` |
//! | `WO_WORKER_SHARE` | `sample.workers` |
//! | `WO_MESSAGE_TTL_SECS` | `60` (capped at 60) |
//! | `WO_HTTP_PORT` | `3000` |
//! | `WO_WORKERS` | `2` |
//! | `WO_SIMULATED_WORK_MS` | `0` |

use shared_types::TopicConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub broker: BrokerConfig,
    /// Topic names, subscription names and message expiry.
    pub topics: TopicConfig,
    pub http: HttpConfig,
    pub workers: WorkersConfig,
}

impl NodeConfig {
    /// Reject configurations the protocol cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("work topic", &self.topics.work_topic),
            ("notification topic", &self.topics.notification_topic),
            ("subscription name", &self.topics.subscription_name),
            ("worker share", &self.topics.worker_share),
        ];
        if let Some((field, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Empty(*field));
        }
        if self.topics.message_ttl().is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("message TTL must be greater than zero")]
    ZeroTtl,
}

/// Broker connection.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Connection identity, e.g. `amqp://localhost:5672`.
    pub service: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            service: "amqp://localhost:5672".to_string(),
        }
    }
}

/// REST surface.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Worker pool.
#[derive(Debug, Clone)]
pub struct WorkersConfig {
    /// Number of processing flows. Zero runs a front-end only node.
    pub count: usize,
    /// Artificial delay per work item.
    pub simulated_work: Duration,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: 2,
            simulated_work: Duration::ZERO,
        }
    }
}

/// Load configuration from the environment.
pub fn load_config() -> NodeConfig {
    config_from(|key| env::var(key).ok())
}

/// Build configuration from an arbitrary variable source.
///
/// Unparsable numbers are logged and the default kept.
pub fn config_from<F>(lookup: F) -> NodeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::default();

    if let Some(service) = lookup("WO_BROKER_SERVICE") {
        config.broker.service = service;
    }
    if let Some(topic) = lookup("WO_WORK_TOPIC") {
        config.topics.work_topic = topic;
    }
    if let Some(topic) = lookup("WO_NOTIFICATION_TOPIC") {
        config.topics.notification_topic = topic;
    }
    if let Some(name) = lookup("WO_SUBSCRIPTION_NAME") {
        config.topics.subscription_name = name;
    }
    if let Some(share) = lookup("WO_WORKER_SHARE") {
        config.topics.worker_share = share;
    }
    if let Some(secs) = parsed::<u64>(&lookup, "WO_MESSAGE_TTL_SECS") {
        config.topics = config.topics.with_message_ttl(Duration::from_secs(secs));
        if config.topics.message_ttl().as_secs() < secs {
            info!(
                requested = secs,
                applied = config.topics.message_ttl().as_secs(),
                "Message TTL capped"
            );
        }
    }
    if let Some(port) = parsed(&lookup, "WO_HTTP_PORT") {
        config.http.port = port;
    }
    if let Some(count) = parsed(&lookup, "WO_WORKERS") {
        config.workers.count = count;
    }
    if let Some(ms) = parsed(&lookup, "WO_SIMULATED_WORK_MS") {
        config.workers.simulated_work = Duration::from_millis(ms);
    }

    config
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}
