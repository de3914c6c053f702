//! Authorization status and its lifecycle state machine.
//!
//! ```text
//! NotRequested ──► Pending ──► Authorized
//!      │              ├──────► Rejected(retryable) ──► NotRequested
//!      │              └──────► Rejected(permanent)
//!      └─────────────────────► Rejected(permanent)
//! ```
//!
//! `Authorized` and `Rejected(permanent)` are terminal for a transaction.

use serde::{Deserialize, Serialize};

use super::values::{AuthorizationToken, Rejection, RejectionClass};
use crate::domain::foundation::StateMachine;

/// Latest known authorization status of a purchase transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// Known to the device, never submitted (or eligible again).
    NotRequested,

    /// Submitted to the authorization service, result outstanding.
    Pending,

    /// The service granted a signed authorization.
    Authorized { token: AuthorizationToken },

    /// The service refused the transaction.
    Rejected(Rejection),
}

impl AuthorizationStatus {
    /// Returns the payload-free lifecycle phase of this status.
    pub fn phase(&self) -> AuthorizationPhase {
        match self {
            AuthorizationStatus::NotRequested => AuthorizationPhase::NotRequested,
            AuthorizationStatus::Pending => AuthorizationPhase::Pending,
            AuthorizationStatus::Authorized { .. } => AuthorizationPhase::Authorized,
            AuthorizationStatus::Rejected(rejection) => match rejection.class {
                RejectionClass::Retryable => AuthorizationPhase::RejectedRetryable,
                RejectionClass::Permanent => AuthorizationPhase::RejectedPermanent,
            },
        }
    }

    /// Returns true if the transaction grants entitlement.
    pub fn is_entitled(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized { .. })
    }

    /// Returns true if the transaction may be submitted for authorization.
    pub fn is_eligible_for_request(&self) -> bool {
        matches!(self, AuthorizationStatus::NotRequested)
    }

    /// Returns true if no further status change can happen.
    ///
    /// A terminal, non-entitled status is what the UI shows as
    /// "not entitled".
    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Lifecycle phase of an authorization record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationPhase {
    NotRequested,
    Pending,
    Authorized,
    RejectedRetryable,
    RejectedPermanent,
}

impl StateMachine for AuthorizationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AuthorizationPhase::*;
        matches!(
            (self, target),
            // Submission
            (NotRequested, Pending)
            // Authorization result
                | (Pending, Authorized)
                | (Pending, RejectedRetryable)
                | (Pending, RejectedPermanent)
            // Reconciliation
                | (RejectedRetryable, NotRequested)
                | (NotRequested, RejectedPermanent)
                | (RejectedRetryable, RejectedPermanent)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AuthorizationPhase::*;
        match self {
            NotRequested => vec![Pending, RejectedPermanent],
            Pending => vec![Authorized, RejectedRetryable, RejectedPermanent],
            RejectedRetryable => vec![NotRequested, RejectedPermanent],
            Authorized => vec![],
            RejectedPermanent => vec![],
        }
    }
}
