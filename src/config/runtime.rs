//! Runtime configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Runtime configuration (environment, logging, scheduling)
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// Tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Seconds between purchase refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Capacity of the store's action channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Step budget for one-shot drives
    #[serde(default = "default_max_drive_steps")]
    pub max_drive_steps: usize,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl RuntimeConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Validate runtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        if self.channel_capacity == 0 || self.channel_capacity > 4096 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        if self.max_drive_steps == 0 {
            return Err(ValidationError::InvalidStepBudget);
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            refresh_interval_secs: default_refresh_interval(),
            channel_capacity: default_channel_capacity(),
            max_drive_steps: default_max_drive_steps(),
        }
    }
}

fn default_log_level() -> String {
    "info,subscription_auth=debug".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_channel_capacity() -> usize {
    64
}

fn default_max_drive_steps() -> usize {
    10_000
}
