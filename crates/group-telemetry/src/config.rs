//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `group_com=debug,info`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to register the Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "process-group".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PG_SERVICE_NAME`: Service name (default: process-group)
    /// - `PG_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `PG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `PG_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `PG_METRICS`: Register Prometheus metrics (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service_name: env::var("PG_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("PG_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: env::var("PG_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, defaults.console_output))
                .unwrap_or(defaults.console_output),

            json_logs: env::var("PG_JSON_LOGS")
                .map(|v| parse_flag(&v, defaults.json_logs))
                .unwrap_or(defaults.json_logs),

            metrics_enabled: env::var("PG_METRICS")
                .map(|v| parse_flag(&v, defaults.metrics_enabled))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Configuration for a named service, otherwise from the environment.
    pub fn for_service(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            ..Self::from_env()
        }
    }
}

/// `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`, case-insensitive.
/// Anything else keeps `default`.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
