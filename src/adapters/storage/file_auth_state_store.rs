//! File-based Auth State Store Adapter
//!
//! Stores the authorization map as a versioned YAML document:
//!
//! ```yaml
//! version: 1
//! purchases:
//!   "1000000123":
//!     status:
//!       state: authorized
//!       token: "..."
//!     updated_at: "2024-01-01T00:00:00Z"
//! ```
//!
//! Writes go to a temporary sibling file that is then renamed over the
//! target, so a crash mid-write leaves the previous document intact.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::subscription::AuthStateMap;
use crate::ports::{AuthStateStore, PersistenceError};

/// Layout version written by this adapter.
pub const STATE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct StoredDocumentRef<'a> {
    version: u32,
    purchases: &'a AuthStateMap,
}

#[derive(Deserialize)]
struct StoredDocument {
    version: u32,
    #[serde(default)]
    purchases: AuthStateMap,
}

/// File-based storage for the authorization map
#[derive(Debug, Clone)]
pub struct FileAuthStateStore {
    path: PathBuf,
}

impl FileAuthStateStore {
    /// Create a store backed by the YAML file at `path`
    ///
    /// The file and its parent directories are created on first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl AuthStateStore for FileAuthStateStore {
    async fn load(&self) -> Result<AuthStateMap, PersistenceError> {
        let yaml = match fs::read_to_string(&self.path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No stored authorization state");
                return Ok(AuthStateMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        if yaml.trim().is_empty() {
            return Ok(AuthStateMap::new());
        }

        let document: StoredDocument = serde_yaml::from_str(&yaml)
            .map_err(|e| PersistenceError::Deserialization(e.to_string()))?;

        if document.version != STATE_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: document.version,
                expected: STATE_FORMAT_VERSION,
            });
        }

        Ok(document.purchases)
    }

    async fn save(&self, map: &AuthStateMap) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let yaml = serde_yaml::to_string(&StoredDocumentRef {
            version: STATE_FORMAT_VERSION,
            purchases: map,
        })
        .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, yaml).await?;
        fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), records = map.len(), "Saved authorization state");
        Ok(())
    }
}
