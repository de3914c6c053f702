//! Reducer inputs.
//!
//! Actions come in two types:
//!
//! - [`SubscriptionAction`] - what the host (UI, purchase observation,
//!   timers) may dispatch.
//! - [`InternalAction`] - results of effects. Only the effect runner in this
//!   crate can construct them, so a host can never forge an authorization
//!   result.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::record::AuthStateMap;
use super::values::{AuthorizationToken, ReasonCode, Rejection};
use crate::domain::foundation::{Timestamp, TransactionId};

/// Why the local purchase data may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalDataUpdateKind {
    /// The set of authorizations rejected by the remote authority changed.
    RejectedAuthorizationsUpdated,

    /// The storefront reported new or changed purchase transactions.
    PurchasesRefreshed,

    /// Connectivity to the authorization service came back.
    ConnectivityRestored,
}

impl fmt::Display for LocalDataUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocalDataUpdateKind::RejectedAuthorizationsUpdated => "rejected_authorizations_updated",
            LocalDataUpdateKind::PurchasesRefreshed => "purchases_refreshed",
            LocalDataUpdateKind::ConnectivityRestored => "connectivity_restored",
        };
        write!(f, "{}", s)
    }
}

/// Failure payload of a stored-state load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStateLoadError {
    pub message: String,
}

impl StoredStateLoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoredStateLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Actions the host may dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    /// Local purchase data changed; read it and reconcile.
    LocalDataUpdate(LocalDataUpdateKind),

    /// The persisted authorization map finished loading.
    DidLoadStoredPurchaseAuthState {
        result: Result<AuthStateMap, StoredStateLoadError>,
        replay: Option<LocalDataUpdateKind>,
    },

    /// Submit the next eligible transaction for authorization.
    RequestAuthorizationForPurchases,
}

/// Freshly observed local purchase facts, stamped when they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDataDiff {
    pub kind: LocalDataUpdateKind,
    pub observed_at: Timestamp,

    /// Transactions present on the device.
    pub observed: BTreeSet<TransactionId>,

    /// Transactions the remote authority rejected for good.
    pub permanently_rejected: BTreeMap<TransactionId, ReasonCode>,
}

impl LocalDataDiff {
    pub fn new(kind: LocalDataUpdateKind, observed_at: Timestamp) -> Self {
        Self {
            kind,
            observed_at,
            observed: BTreeSet::new(),
            permanently_rejected: BTreeMap::new(),
        }
    }

    pub fn with_observed(mut self, id: TransactionId) -> Self {
        self.observed.insert(id);
        self
    }

    pub fn with_rejected(mut self, id: TransactionId, code: ReasonCode) -> Self {
        self.permanently_rejected.insert(id, code);
        self
    }
}

/// Result of one call to the authorization service.
pub type AuthorizationOutcome = Result<AuthorizationToken, Rejection>;

/// Effect results fed back into the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalAction(pub(crate) InternalEvent);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InternalEvent {
    LocalDataUpdateResult(LocalDataDiff),
    AuthorizationRequestResult {
        transaction_id: TransactionId,
        outcome: AuthorizationOutcome,
        completed_at: Timestamp,
    },
}

impl InternalAction {
    pub(crate) fn local_data_update_result(diff: LocalDataDiff) -> Self {
        Self(InternalEvent::LocalDataUpdateResult(diff))
    }

    pub(crate) fn authorization_request_result(
        transaction_id: TransactionId,
        outcome: AuthorizationOutcome,
        completed_at: Timestamp,
    ) -> Self {
        Self(InternalEvent::AuthorizationRequestResult {
            transaction_id,
            outcome,
            completed_at,
        })
    }

    /// Returns the transaction an authorization result refers to.
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match &self.0 {
            InternalEvent::AuthorizationRequestResult { transaction_id, .. } => {
                Some(transaction_id)
            }
            InternalEvent::LocalDataUpdateResult(_) => None,
        }
    }
}

/// Reducer input: a host action or an effect result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    External(SubscriptionAction),
    Internal(InternalAction),
}

impl Action {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Action::External(SubscriptionAction::LocalDataUpdate(_)) => "local_data_update",
            Action::External(SubscriptionAction::DidLoadStoredPurchaseAuthState { .. }) => {
                "did_load_stored_purchase_auth_state"
            }
            Action::External(SubscriptionAction::RequestAuthorizationForPurchases) => {
                "request_authorization_for_purchases"
            }
            Action::Internal(InternalAction(InternalEvent::LocalDataUpdateResult(_))) => {
                "local_data_update_result"
            }
            Action::Internal(InternalAction(InternalEvent::AuthorizationRequestResult {
                ..
            })) => "authorization_request_result",
        }
    }
}

impl From<SubscriptionAction> for Action {
    fn from(action: SubscriptionAction) -> Self {
        Action::External(action)
    }
}

impl From<InternalAction> for Action {
    fn from(action: InternalAction) -> Self {
        Action::Internal(action)
    }
}
