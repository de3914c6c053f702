//! Authorization client port for the remote purchase authorization service.
//!
//! The service inspects a purchase transaction and either issues an
//! authorization token or refuses. Refusals are classified so the domain
//! knows whether asking again is worthwhile.

use async_trait::async_trait;

use crate::domain::foundation::TransactionId;
use crate::domain::subscription::{AuthorizationToken, Rejection};

/// Port for requesting authorization of a purchase transaction.
///
/// One call per transaction per request; the domain guarantees that at
/// most one call for a given transaction is outstanding.
#[async_trait]
pub trait AuthorizationClient: Send + Sync {
    /// Ask the service to authorize `transaction_id`.
    ///
    /// # Errors
    /// Returns `AuthorizationError::Retryable` for transient failures
    /// (transport, timeout, throttling, server errors) and
    /// `AuthorizationError::Permanent` when the service refuses the
    /// transaction for good.
    async fn authorize(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<AuthorizationToken, AuthorizationError>;
}

/// Authorization failure, classified by whether a retry can succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Retryable authorization failure ({code}): {message}")]
    Retryable { code: String, message: String },

    #[error("Authorization refused ({code}): {message}")]
    Permanent { code: String, message: String },
}

impl AuthorizationError {
    pub fn retryable(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthorizationError::Retryable {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn permanent(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthorizationError::Permanent {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthorizationError::Retryable { code, .. } => code,
            AuthorizationError::Permanent { code, .. } => code,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthorizationError::Retryable { .. })
    }
}

impl From<AuthorizationError> for Rejection {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::Retryable { code, .. } => Rejection::retryable(code),
            AuthorizationError::Permanent { code, .. } => Rejection::permanent(code),
        }
    }
}
