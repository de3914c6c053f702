//! Mock authorization client for testing.
//!
//! Provides a scriptable implementation of `AuthorizationClient` for unit
//! and integration tests. Supports:
//! - Per-transaction scripted responses, consumed in order
//! - A default response for unscripted transactions
//! - Call tracking
//! - Artificial latency

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::TransactionId;
use crate::domain::subscription::AuthorizationToken;
use crate::ports::{AuthorizationClient, AuthorizationError};

type ScriptedResponse = Result<AuthorizationToken, AuthorizationError>;

/// Response for transactions without a script.
#[derive(Debug, Clone, Default)]
pub enum DefaultResponse {
    /// Grant a token derived from the transaction id.
    #[default]
    Grant,

    /// Fail with the given error.
    Fail(AuthorizationError),
}

/// Mock authorization client for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockAuthorizationClient::new();
/// mock.script(id.clone(), Err(AuthorizationError::retryable("http_503", "busy")));
/// mock.script(id.clone(), Ok(AuthorizationToken::new("tok")));
///
/// // First call fails, second succeeds, later calls use the default.
/// ```
#[derive(Clone, Default)]
pub struct MockAuthorizationClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    scripts: HashMap<TransactionId, VecDeque<ScriptedResponse>>,
    default_response: DefaultResponse,
    call_log: Vec<TransactionId>,
    latency: Option<Duration>,
}

impl MockAuthorizationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails every unscripted call with `error`.
    pub fn failing(error: AuthorizationError) -> Self {
        let mock = Self::new();
        mock.state().default_response = DefaultResponse::Fail(error);
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response for the next call about `transaction_id`.
    pub fn script(&self, transaction_id: TransactionId, response: ScriptedResponse) {
        self.state()
            .scripts
            .entry(transaction_id)
            .or_default()
            .push_back(response);
    }

    /// Set the response for unscripted transactions.
    pub fn set_default(&self, response: DefaultResponse) {
        self.state().default_response = response;
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    /// Token granted by default for `transaction_id`.
    pub fn default_token(transaction_id: &TransactionId) -> AuthorizationToken {
        AuthorizationToken::new(format!("token-{}", transaction_id))
    }

    /// Transactions submitted so far, in call order.
    pub fn calls(&self) -> Vec<TransactionId> {
        self.state().call_log.clone()
    }

    /// Number of calls made for `transaction_id`.
    pub fn call_count(&self, transaction_id: &TransactionId) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|id| *id == transaction_id)
            .count()
    }

    fn next_response(&self, transaction_id: &TransactionId) -> (ScriptedResponse, Option<Duration>) {
        let mut state = self.state();
        state.call_log.push(transaction_id.clone());

        let scripted = state
            .scripts
            .get_mut(transaction_id)
            .and_then(|queue| queue.pop_front());

        let response = match scripted {
            Some(response) => response,
            None => match &state.default_response {
                DefaultResponse::Grant => Ok(Self::default_token(transaction_id)),
                DefaultResponse::Fail(e) => Err(e.clone()),
            },
        };
        (response, state.latency)
    }
}

#[async_trait]
impl AuthorizationClient for MockAuthorizationClient {
    async fn authorize(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<AuthorizationToken, AuthorizationError> {
        let (response, latency) = self.next_response(transaction_id);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        response
    }
}
