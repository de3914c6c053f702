//! Storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Locations of the files the service reads and writes
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Persisted authorization map
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Purchase ledger maintained by the purchase-observation layer
    #[serde(default = "default_purchases_path")]
    pub purchases_path: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.state_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__STATE_PATH"));
        }
        if self.purchases_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__PURCHASES_PATH"));
        }
        if self.state_path == self.purchases_path {
            return Err(ValidationError::ConflictingPaths);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            purchases_path: default_purchases_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./data/purchase_auth_state.yaml")
}

fn default_purchases_path() -> PathBuf {
    PathBuf::from("./data/purchases.yaml")
}
