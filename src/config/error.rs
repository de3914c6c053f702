//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid authorization service URL")]
    InvalidBaseUrl,

    #[error("Authorization service must use HTTPS in production")]
    BaseUrlMustBeHttps,

    #[error("Invalid request timeout (must be 1-300 seconds)")]
    InvalidTimeout,

    #[error("Invalid refresh interval (must be greater than zero)")]
    InvalidRefreshInterval,

    #[error("Invalid channel capacity (must be 1-4096)")]
    InvalidChannelCapacity,

    #[error("Invalid drive step budget (must be greater than zero)")]
    InvalidStepBudget,

    #[error("State and purchase ledger paths must differ")]
    ConflictingPaths,
}
