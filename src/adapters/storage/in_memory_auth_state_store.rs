//! In-Memory Auth State Store Adapter
//!
//! Keeps the authorization map in memory. Useful for testing and
//! development; failures can be injected to exercise recovery paths.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::subscription::AuthStateMap;
use crate::ports::{AuthStateStore, PersistenceError};

#[derive(Debug, Default)]
struct StoreState {
    map: AuthStateMap,
    saves: usize,
    fail_load: Option<String>,
    fail_save: Option<String>,
}

/// In-memory storage for the authorization map
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStateStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryAuthStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `map`
    pub fn with_map(map: AuthStateMap) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                map,
                ..StoreState::default()
            })),
        }
    }

    /// Make every subsequent load fail with a deserialization error
    pub async fn fail_loads(&self, message: impl Into<String>) {
        self.state.write().await.fail_load = Some(message.into());
    }

    /// Make every subsequent save fail with an IO error
    pub async fn fail_saves(&self, message: impl Into<String>) {
        self.state.write().await.fail_save = Some(message.into());
    }

    /// Get the currently stored map
    pub async fn stored(&self) -> AuthStateMap {
        self.state.read().await.map.clone()
    }

    /// Get the number of successful saves
    pub async fn save_count(&self) -> usize {
        self.state.read().await.saves
    }
}

#[async_trait]
impl AuthStateStore for InMemoryAuthStateStore {
    async fn load(&self) -> Result<AuthStateMap, PersistenceError> {
        let state = self.state.read().await;
        match &state.fail_load {
            Some(message) => Err(PersistenceError::Deserialization(message.clone())),
            None => Ok(state.map.clone()),
        }
    }

    async fn save(&self, map: &AuthStateMap) -> Result<(), PersistenceError> {
        let mut state = self.state.write().await;
        if let Some(message) = &state.fail_save {
            return Err(PersistenceError::Io(message.clone()));
        }
        state.map = map.clone();
        state.saves += 1;
        Ok(())
    }
}
