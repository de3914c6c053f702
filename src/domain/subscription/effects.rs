//! Effect descriptions returned by the reducer.
//!
//! The reducer never performs work itself. It returns these values and the
//! effect runner executes them, reporting completion as new actions.

use super::actions::LocalDataUpdateKind;
use super::record::AuthStateMap;
use crate::domain::foundation::TransactionId;

/// Asynchronous work requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load the persisted authorization map.
    ///
    /// Yields `DidLoadStoredPurchaseAuthState`, carrying `replay` along.
    LoadStoredAuthState { replay: Option<LocalDataUpdateKind> },

    /// Read the latest local purchase facts.
    ///
    /// Yields a local data update result, or nothing if the source fails.
    LoadLocalPurchaseData { kind: LocalDataUpdateKind },

    /// Submit one transaction to the authorization service.
    ///
    /// Always yields exactly one authorization request result.
    RequestAuthorization { transaction_id: TransactionId },

    /// Persist a snapshot of the authorization map. Yields nothing.
    PersistAuthState { snapshot: AuthStateMap },

    /// Re-dispatch a local data update that arrived before the stored
    /// state was loaded.
    Replay(LocalDataUpdateKind),
}

impl Effect {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::LoadStoredAuthState { .. } => "load_stored_auth_state",
            Effect::LoadLocalPurchaseData { .. } => "load_local_purchase_data",
            Effect::RequestAuthorization { .. } => "request_authorization",
            Effect::PersistAuthState { .. } => "persist_auth_state",
            Effect::Replay(_) => "replay",
        }
    }
}
