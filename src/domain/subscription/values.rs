//! Value objects carried by authorization records and results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed authorization returned by the remote authorization service.
///
/// Opaque to this crate; stored verbatim so it survives persistence
/// round trips byte for byte.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationToken(String);

impl AuthorizationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens grant access; keep them out of log output.
impl fmt::Debug for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationToken(<{} bytes>)", self.0.len())
    }
}

/// Machine-readable reason attached to a rejection (e.g. `http_403`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCode(String);

impl ReasonCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether re-requesting authorization after a failure is worthwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionClass {
    /// Transient failure; the transaction becomes eligible again after the
    /// next local data reconciliation.
    Retryable,

    /// The remote authority refuses this transaction for good.
    Permanent,
}

/// A classified authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rejection {
    pub class: RejectionClass,
    pub code: ReasonCode,
}

impl Rejection {
    pub fn retryable(code: impl Into<String>) -> Self {
        Self {
            class: RejectionClass::Retryable,
            code: ReasonCode::new(code),
        }
    }

    pub fn permanent(code: impl Into<String>) -> Self {
        Self {
            class: RejectionClass::Permanent,
            code: ReasonCode::new(code),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.class == RejectionClass::Permanent
    }
}
