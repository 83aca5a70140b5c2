//! # Group Telemetry
//!
//! Logging and metrics for process-group runs.
//!
//! ## Components
//!
//! - **Tracing**: global `tracing-subscriber` with an `EnvFilter` and pretty or
//!   JSON output
//! - **Metrics**: Prometheus counters fed from middleware snapshots, rendered
//!   in text exposition format on demand
//!
//! ## Usage
//!
//! ```rust,ignore
//! use group_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PG_SERVICE_NAME` | `process-group` | Service name in the startup line |
//! | `PG_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `PG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PG_JSON_LOGS` | `false` | JSON instead of pretty logs |
//! | `PG_METRICS` | `true` | Register Prometheus metrics |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, record_process_clock, record_snapshot, register_metrics, MetricsHandle,
    BARRIER_ROUNDS, CRITICAL_SECTION_ENTRIES, GROUP_SIZE, MESSAGES_DELIVERED, MESSAGES_DROPPED,
    MESSAGES_RECEIVED, MESSAGES_SENT, PROCESS_CLOCK, TOKEN_PASSES,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and, if enabled, metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so startup logs can already be counted against them
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };

    init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Whether Prometheus metrics were registered.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
