//! Subscription authorization state owned by the reducer.

use std::collections::BTreeSet;

use super::actions::LocalDataUpdateKind;
use super::record::AuthStateMap;
use super::status::AuthorizationStatus;
use crate::domain::foundation::TransactionId;

/// Where the session is in reading the stored authorization map.
///
/// The store is read once per session. Updates that arrive while the read
/// is outstanding wait in `Loading` instead of starting another read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum StoredAuthState {
    #[default]
    NotLoaded,
    Loading { queued: Vec<LocalDataUpdateKind> },
    Loaded(AuthStateMap),
}

impl StoredAuthState {
    pub(crate) fn map(&self) -> Option<&AuthStateMap> {
        match self {
            StoredAuthState::Loaded(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn map_mut(&mut self) -> Option<&mut AuthStateMap> {
        match self {
            StoredAuthState::Loaded(map) => Some(map),
            _ => None,
        }
    }
}

/// Aggregate authorization state for the session.
///
/// Created empty at session start and mutated only by
/// [`reduce`](super::reduce). Readers get cloned snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionState {
    /// Authorization map, once the stored state has been read this session.
    pub(crate) purchases_auth_state: StoredAuthState,

    /// Transactions submitted to the authorization service and awaiting a result.
    pub(crate) transactions_pending_auth_request: BTreeSet<TransactionId>,
}

impl SubscriptionState {
    /// Creates the state of a fresh session, before stored state is loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state whose stored authorization map is already known.
    pub fn loaded(map: AuthStateMap) -> Self {
        Self {
            purchases_auth_state: StoredAuthState::Loaded(map),
            transactions_pending_auth_request: BTreeSet::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.purchases_auth_state, StoredAuthState::Loaded(_))
    }

    /// True while the stored-state read is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self.purchases_auth_state, StoredAuthState::Loading { .. })
    }

    pub fn purchases_auth_state(&self) -> Option<&AuthStateMap> {
        self.purchases_auth_state.map()
    }

    pub fn transactions_pending_auth_request(&self) -> &BTreeSet<TransactionId> {
        &self.transactions_pending_auth_request
    }

    pub fn status_of(&self, id: &TransactionId) -> Option<&AuthorizationStatus> {
        self.purchases_auth_state().and_then(|map| map.status_of(id))
    }

    /// Returns true if every in-flight transaction is recorded as `Pending`.
    pub fn pending_requests_are_recorded(&self) -> bool {
        self.transactions_pending_auth_request
            .iter()
            .all(|id| matches!(self.status_of(id), Some(AuthorizationStatus::Pending)))
    }
}
