//! In-memory local purchase data for tests and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::TransactionId;
use crate::domain::subscription::ReasonCode;
use crate::ports::{LocalPurchaseDataSource, LocalPurchaseSnapshot, PurchaseDataError};

#[derive(Debug, Default)]
struct PurchaseState {
    snapshot: LocalPurchaseSnapshot,
    failure: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPurchaseData {
    state: Arc<RwLock<PurchaseState>>,
}

impl InMemoryPurchaseData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase transaction as present on the device.
    pub async fn add_transaction(&self, id: TransactionId) {
        self.state.write().await.snapshot.transactions.insert(id);
    }

    /// Record that the remote authority rejected `id` for good.
    pub async fn reject(&self, id: TransactionId, code: ReasonCode) {
        self.state.write().await.snapshot.rejected.insert(id, code);
    }

    /// Make reads fail until cleared.
    pub async fn set_failure(&self, message: Option<String>) {
        self.state.write().await.failure = message;
    }
}

#[async_trait]
impl LocalPurchaseDataSource for InMemoryPurchaseData {
    async fn snapshot(&self) -> Result<LocalPurchaseSnapshot, PurchaseDataError> {
        let state = self.state.read().await;
        match &state.failure {
            Some(message) => Err(PurchaseDataError::Io(message.clone())),
            None => Ok(state.snapshot.clone()),
        }
    }
}
