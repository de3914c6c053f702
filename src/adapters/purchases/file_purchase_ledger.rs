//! File-based purchase ledger adapter.
//!
//! Reads the YAML ledger maintained by the purchase-observation layer:
//!
//! ```yaml
//! transactions:
//!   - "1000000001"
//!   - "1000000002"
//! rejected:
//!   "1000000002": http_403
//! ```
//!
//! A missing ledger means no purchases have been observed yet.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{LocalPurchaseDataSource, LocalPurchaseSnapshot, PurchaseDataError};

#[derive(Debug, Clone)]
pub struct FilePurchaseLedger {
    path: PathBuf,
}

impl FilePurchaseLedger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl LocalPurchaseDataSource for FilePurchaseLedger {
    async fn snapshot(&self) -> Result<LocalPurchaseSnapshot, PurchaseDataError> {
        let yaml = match fs::read_to_string(&self.path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No purchase ledger yet");
                return Ok(LocalPurchaseSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        if yaml.trim().is_empty() {
            return Ok(LocalPurchaseSnapshot::default());
        }

        serde_yaml::from_str(&yaml).map_err(|e| PurchaseDataError::Deserialization(e.to_string()))
    }
}
