//! Node configuration.

pub mod config;

pub use config::{config_from, load_config, BrokerConfig, ConfigError, HttpConfig, NodeConfig, WorkersConfig};
