//! Local purchase data port.
//!
//! Exposes what the device currently knows about purchases: which
//! transactions exist and which of them the remote authority has already
//! rejected for good. Written by the purchase-observation layer, read here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::subscription::{LocalDataDiff, LocalDataUpdateKind, ReasonCode};

/// Errors that can occur while reading local purchase data.
#[derive(Debug, thiserror::Error)]
pub enum PurchaseDataError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse purchase data: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for PurchaseDataError {
    fn from(e: std::io::Error) -> Self {
        PurchaseDataError::Io(e.to_string())
    }
}

/// Point-in-time view of local purchase facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPurchaseSnapshot {
    /// Transactions present on the device.
    #[serde(default)]
    pub transactions: BTreeSet<TransactionId>,

    /// Transactions the remote authority rejected, with its reason code.
    #[serde(default)]
    pub rejected: BTreeMap<TransactionId, ReasonCode>,
}

impl LocalPurchaseSnapshot {
    /// Stamps the snapshot as a reconciliation input.
    pub fn into_diff(self, kind: LocalDataUpdateKind, observed_at: Timestamp) -> LocalDataDiff {
        LocalDataDiff {
            kind,
            observed_at,
            observed: self.transactions,
            permanently_rejected: self.rejected,
        }
    }
}

/// Port for reading local purchase data.
#[async_trait]
pub trait LocalPurchaseDataSource: Send + Sync {
    /// Read the current snapshot.
    ///
    /// # Errors
    /// Returns `PurchaseDataError` if the data cannot be read or parsed.
    async fn snapshot(&self) -> Result<LocalPurchaseSnapshot, PurchaseDataError>;
}
