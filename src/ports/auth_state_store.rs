//! Auth State Store Port - Interface for persisting the authorization map.
//!
//! The map is loaded once per session and saved after every change. A
//! store that has never been written loads as an empty map.

use async_trait::async_trait;

use crate::domain::subscription::{AuthStateMap, StoredStateLoadError};

/// Errors that can occur while loading or saving the authorization map.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize authorization state: {0}")]
    Serialization(String),

    #[error("Failed to deserialize authorization state: {0}")]
    Deserialization(String),

    #[error("Unsupported authorization state version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e.to_string())
    }
}

impl From<PersistenceError> for StoredStateLoadError {
    fn from(e: PersistenceError) -> Self {
        StoredStateLoadError::new(e.to_string())
    }
}

/// Port for loading and saving the per-transaction authorization map.
#[async_trait]
pub trait AuthStateStore: Send + Sync {
    /// Load the stored map.
    ///
    /// # Errors
    /// Returns `PersistenceError` if the stored data exists but cannot be read.
    async fn load(&self) -> Result<AuthStateMap, PersistenceError>;

    /// Replace the stored map with `map`.
    ///
    /// # Errors
    /// Returns `PersistenceError` if the map cannot be written.
    async fn save(&self, map: &AuthStateMap) -> Result<(), PersistenceError>;
}
