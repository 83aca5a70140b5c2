//! # Runtime Configuration
//!
//! Group shape plus the pacing of the demo processes.

use std::time::Duration;

use group_com::config::{parse_var, ENV_TOKEN_PASS_DELAY_MS};
use group_com::{ConfigError, GroupConfig};

/// Token pacing used by the launcher unless `PG_TOKEN_PASS_DELAY_MS` is set.
/// Keeps an idle ring from spinning the token dispatcher.
pub const DEFAULT_TOKEN_PASS_DELAY: Duration = Duration::from_millis(100);

/// Complete launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Middleware configuration.
    pub group: GroupConfig,
    /// How long the processes run before being stopped.
    pub running_time: Duration,
    /// Pause between two iterations of a process loop.
    pub loop_interval: Duration,
    /// Time spent inside the critical section.
    pub critical_section_work: Duration,
    /// A process broadcasts a heartbeat every this many loops.
    pub heartbeat_every: u64,
    /// Print the run report as JSON on stdout.
    pub report_json: bool,
    /// Print Prometheus metrics on stdout at shutdown.
    pub print_metrics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            group: GroupConfig::default().token_pass_delay(DEFAULT_TOKEN_PASS_DELAY),
            running_time: Duration::from_secs(5),
            loop_interval: Duration::from_millis(800),
            critical_section_work: Duration::from_millis(1000),
            heartbeat_every: 3,
            report_json: false,
            print_metrics: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `PG_PROCESS_COUNT`, `PG_TOKEN_PASS_DELAY_MS`: see [`GroupConfig`]
    /// - `PG_RUNNING_TIME_SECS`: running time (default: 5)
    /// - `PG_LOOP_INTERVAL_MS`: loop pause (default: 800)
    /// - `PG_CS_WORK_MS`: critical-section work (default: 1000)
    /// - `PG_HEARTBEAT_EVERY`: loops between heartbeats (default: 3)
    /// - `PG_REPORT_JSON`: print the report as JSON (default: false)
    /// - `PG_PRINT_METRICS`: print Prometheus metrics (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut group = GroupConfig::from_lookup(&lookup)?;
        if lookup(ENV_TOKEN_PASS_DELAY_MS).is_none() {
            group.token_pass_delay = DEFAULT_TOKEN_PASS_DELAY;
        }

        let config = Self {
            group,
            running_time: parse_var(&lookup, "PG_RUNNING_TIME_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.running_time),
            loop_interval: parse_var(&lookup, "PG_LOOP_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.loop_interval),
            critical_section_work: parse_var(&lookup, "PG_CS_WORK_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.critical_section_work),
            heartbeat_every: parse_var(&lookup, "PG_HEARTBEAT_EVERY")?
                .unwrap_or(defaults.heartbeat_every),
            report_json: parse_var(&lookup, "PG_REPORT_JSON")?.unwrap_or(defaults.report_json),
            print_metrics: parse_var(&lookup, "PG_PRINT_METRICS")?
                .unwrap_or(defaults.print_metrics),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the launcher cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.group.validate()?;
        if self.heartbeat_every == 0 {
            return Err(ConfigError::InvalidEnv {
                var: "PG_HEARTBEAT_EVERY".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
