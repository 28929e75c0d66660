//! # Offload Telemetry
//!
//! Structured logging for the worker offload node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use offload_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `worker-offload` | Service name attached to the startup record |
//! | `WO_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directives |
//! | `WO_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `WO_JSON_LOGS` | `false` (`true` in containers) | JSON lines instead of pretty output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {directives:?}: {reason}")]
    Filter { directives: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;
    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Marks the telemetry lifetime; logs on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = TelemetryConfig {
            log_level: "offload=loud".to_string(),
            ..TelemetryConfig::default()
        };
        let err = init_telemetry(&config).err().unwrap();
        assert!(matches!(err, TelemetryError::Filter { .. }));
    }
}
