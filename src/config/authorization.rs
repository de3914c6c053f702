//! Authorization service configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::runtime::Environment;

/// Authorization service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationConfig {
    /// Base URL of the authorization service
    #[serde(default)]
    pub base_url: String,

    /// Bearer key for the authorization service
    pub api_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl AuthorizationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate authorization configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("AUTHORIZATION__BASE_URL"));
        }
        let is_https = self.base_url.starts_with("https://");
        if !is_https && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if *environment == Environment::Production && !is_https {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> AuthorizationConfig {
        AuthorizationConfig {
            base_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_base_url() {
        assert_eq!(
            AuthorizationConfig::default().validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTHORIZATION__BASE_URL"))
        );
    }

    #[test]
    fn test_http_allowed_outside_production() {
        let config = config("http://localhost:9000");
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::BaseUrlMustBeHttps)
        );
    }

    #[test]
    fn test_invalid_scheme() {
        assert_eq!(
            config("ftp://auth.example.com").validate(&Environment::Development),
            Err(ValidationError::InvalidBaseUrl)
        );
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = config("https://auth.example.com");
        config.request_timeout_secs = 0;
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::InvalidTimeout)
        );
        config.request_timeout_secs = 300;
        assert!(config.validate(&Environment::Production).is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
    }
}
