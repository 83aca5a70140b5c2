//! # Group Configuration
//!
//! Static shape of a group. Fixed before the first member joins; changing the
//! group size mid-run is unsupported.

use std::str::FromStr;
use std::time::Duration;

use crate::domain::ConfigError;

/// Environment variable overriding [`GroupConfig::process_count`].
pub const ENV_PROCESS_COUNT: &str = "PG_PROCESS_COUNT";
/// Environment variable overriding [`GroupConfig::token_pass_delay`], in milliseconds.
pub const ENV_TOKEN_PASS_DELAY_MS: &str = "PG_TOKEN_PASS_DELAY_MS";

/// Default group size.
pub const DEFAULT_PROCESS_COUNT: u32 = 3;

/// Group configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    /// Number of processes, N.
    pub process_count: u32,
    /// Pause before a process that does not want the token forwards it.
    /// Zero forwards immediately.
    pub token_pass_delay: Duration,
    /// Prefix of default process names (`P0`, `P1`, ...).
    pub name_prefix: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            process_count: DEFAULT_PROCESS_COUNT,
            token_pass_delay: Duration::ZERO,
            name_prefix: "P".to_string(),
        }
    }
}

impl GroupConfig {
    /// Default configuration for `process_count` members.
    pub fn with_process_count(process_count: u32) -> Self {
        Self {
            process_count,
            ..Self::default()
        }
    }

    /// Builder-style pacing override.
    pub fn token_pass_delay(mut self, delay: Duration) -> Self {
        self.token_pass_delay = delay;
        self
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(count) = parse_var::<u32, _>(&lookup, ENV_PROCESS_COUNT)? {
            config.process_count = count;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TOKEN_PASS_DELAY_MS)? {
            config.token_pass_delay = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no group can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_count == 0 {
            return Err(ConfigError::InvalidGroupSize(self.process_count));
        }
        Ok(())
    }
}

/// Parse an optional environment value.
pub fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw,
        })
}
