//! HTTP authorization service adapter.
//!
//! Implements `AuthorizationClient` against the purchase authorization API:
//!
//! ```text
//! POST {base_url}/v1/authorizations
//! { "transaction_id": "1000000123" }
//!
//! 200 { "token": "<signed authorization>" }
//! ```
//!
//! # Failure classification
//!
//! - Transport errors and timeouts: retryable (`transport`, `timeout`)
//! - 408, 429 and 5xx: retryable (`http_<status>`)
//! - Any other non-success status: permanent (`http_<status>`)
//! - Unparseable success body: retryable (`invalid_response`)
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpAuthorizationConfig::new("https://auth.example.com")
//!     .with_api_key(api_key)
//!     .with_timeout(Duration::from_secs(20));
//! let client = HttpAuthorizationClient::new(config);
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::TransactionId;
use crate::domain::subscription::AuthorizationToken;
use crate::ports::{AuthorizationClient, AuthorizationError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Authorization service connection settings.
#[derive(Clone)]
pub struct HttpAuthorizationConfig {
    /// Base URL of the authorization service, without trailing slash.
    base_url: String,

    /// Bearer key sent with every request, if the service requires one.
    api_key: Option<SecretString>,

    /// Per-request timeout. Expiry is reported as a retryable failure.
    timeout: Duration,
}

impl HttpAuthorizationConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Serialize)]
struct AuthorizationRequestBody<'a> {
    transaction_id: &'a TransactionId,
}

#[derive(Deserialize)]
struct AuthorizationResponseBody {
    token: String,
}

/// Authorization service client over HTTP.
pub struct HttpAuthorizationClient {
    config: HttpAuthorizationConfig,
    http_client: reqwest::Client,
}

impl HttpAuthorizationClient {
    pub fn new(config: HttpAuthorizationConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/authorizations", self.config.base_url)
    }
}

/// Classifies a non-success response status.
///
/// Retryable: 400 (malformed request or receipt not yet verifiable), 401
/// (missing or rotated key), 408, 429 and 5xx. Any other status is the
/// service refusing the purchase and is permanent.
pub fn classify_status(status: StatusCode, body: &str) -> AuthorizationError {
    let code = format!("http_{}", status.as_u16());
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        body.to_string()
    };

    let retryable = [
        StatusCode::BAD_REQUEST,
        StatusCode::UNAUTHORIZED,
        StatusCode::REQUEST_TIMEOUT,
        StatusCode::TOO_MANY_REQUESTS,
    ]
    .contains(&status)
        || status.is_server_error();

    if retryable {
        AuthorizationError::retryable(code, message)
    } else {
        AuthorizationError::permanent(code, message)
    }
}

fn classify_transport(e: &reqwest::Error) -> AuthorizationError {
    if e.is_timeout() {
        AuthorizationError::retryable("timeout", e.to_string())
    } else {
        AuthorizationError::retryable("transport", e.to_string())
    }
}

#[async_trait]
impl AuthorizationClient for HttpAuthorizationClient {
    async fn authorize(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<AuthorizationToken, AuthorizationError> {
        let request_id = Uuid::new_v4();

        let mut request = self
            .http_client
            .post(self.endpoint())
            .timeout(self.config.timeout)
            .header("X-Request-Id", request_id.to_string())
            .json(&AuthorizationRequestBody { transaction_id });

        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            let err = classify_transport(&e);
            tracing::warn!(
                transaction_id = %transaction_id,
                request_id = %request_id,
                error = %e,
                "Authorization request failed to complete"
            );
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            tracing::warn!(
                transaction_id = %transaction_id,
                request_id = %request_id,
                status = status.as_u16(),
                retryable = err.is_retryable(),
                "Authorization service refused request"
            );
            return Err(err);
        }

        let body: AuthorizationResponseBody = response.json().await.map_err(|e| {
            AuthorizationError::retryable(
                "invalid_response",
                format!("Failed to parse authorization response: {}", e),
            )
        })?;

        if body.token.is_empty() {
            return Err(AuthorizationError::retryable(
                "invalid_response",
                "Authorization response carried an empty token",
            ));
        }

        tracing::debug!(
            transaction_id = %transaction_id,
            request_id = %request_id,
            "Authorization granted"
        );
        Ok(AuthorizationToken::new(body.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_credential_errors_are_retryable() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
        ] {
            let err = classify_status(status, "");
            assert!(err.is_retryable(), "{} should be retryable", status);
            assert_eq!(err.code(), format!("http_{}", status.as_u16()));
        }
    }

    #[test]
    fn refusals_are_permanent() {
        for status in [
            StatusCode::PAYMENT_REQUIRED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::GONE,
        ] {
            assert!(!classify_status(status, "").is_retryable(), "{} should be permanent", status);
        }
    }

    #[test]
    fn body_becomes_message() {
        let err = classify_status(StatusCode::FORBIDDEN, "receipt revoked");
        assert_eq!(
            err,
            AuthorizationError::permanent("http_403", "receipt revoked")
        );
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = HttpAuthorizationConfig::new("https://auth.example.com/")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url(), "https://auth.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let client = HttpAuthorizationClient::new(config);
        assert_eq!(
            client.endpoint(),
            "https://auth.example.com/v1/authorizations"
        );
    }
}
