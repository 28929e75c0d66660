//! Telemetry configuration from environment variables.

use std::env;

pub const DEFAULT_SERVICE_NAME: &str = "worker-offload";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name for the startup record
    pub service_name: String,

    /// Filter directives (`info`, `wo_01_frontend=debug,info`, ...)
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: worker-offload)
    /// - `WO_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `WO_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `WO_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            log_level: lookup("WO_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("WO_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("WO_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TelemetryConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_level_precedence() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("RUST_LOG", "warn"),
            ("WO_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_container_defaults_to_json() {
        let config = TelemetryConfig::from_lookup(lookup(&[("DOCKER_CONTAINER", "1")]));
        assert!(config.json_logs);

        let config = TelemetryConfig::from_lookup(lookup(&[
            ("DOCKER_CONTAINER", "1"),
            ("WO_JSON_LOGS", "false"),
        ]));
        assert!(!config.json_logs);
    }

    #[test]
    fn test_console_toggle() {
        for off in ["false", "FALSE", "0"] {
            let config = TelemetryConfig::from_lookup(lookup(&[("WO_CONSOLE_OUTPUT", off)]));
            assert!(!config.console_output, "{off}");
        }
    }
}
