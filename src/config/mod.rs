//! Process configuration, read from `SUBSCRIPTION_AUTH__*` environment
//! variables (and a `.env` file when present) via `config` and `dotenvy`.
//! Nested keys are joined with `__`.
//!
//! ```no_run
//! use subscription_auth::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration should parse");
//! config.validate().expect("configuration should be valid");
//!
//! println!("Authorizing against {}", config.authorization.base_url);
//! ```

mod authorization;
mod error;
mod runtime;
mod storage;

pub use authorization::AuthorizationConfig;
pub use error::{ConfigError, ValidationError};
pub use runtime::{Environment, LogFormat, RuntimeConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Everything the `subscription-auth` binary needs to wire itself up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// File locations (authorization state, purchase ledger)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Authorization service connection
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Environment, logging and scheduling
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    ///
    /// `SUBSCRIPTION_AUTH__RUNTIME__REFRESH_INTERVAL_SECS=30` sets
    /// `runtime.refresh_interval_secs`. Sections left unset take defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` if a value does not parse into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_AUTH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks each section; the authorization section is checked against
    /// the runtime environment.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.authorization.validate(&self.runtime.environment)?;
        self.runtime.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Env vars are process-global; serialize tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "SUBSCRIPTION_AUTH__AUTHORIZATION__BASE_URL",
            "https://auth.example.com",
        );
    }

    fn clear_env() {
        env::remove_var("SUBSCRIPTION_AUTH__AUTHORIZATION__BASE_URL");
        env::remove_var("SUBSCRIPTION_AUTH__AUTHORIZATION__API_KEY");
        env::remove_var("SUBSCRIPTION_AUTH__RUNTIME__ENVIRONMENT");
        env::remove_var("SUBSCRIPTION_AUTH__RUNTIME__REFRESH_INTERVAL_SECS");
        env::remove_var("SUBSCRIPTION_AUTH__RUNTIME__LOG_FORMAT");
        env::remove_var("SUBSCRIPTION_AUTH__STORAGE__STATE_PATH");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.authorization.base_url, "https://auth.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let config = AppConfig::load().unwrap();
        clear_env();

        assert_eq!(
            config.storage.state_path,
            PathBuf::from("./data/purchase_auth_state.yaml")
        );
        assert_eq!(config.authorization.request_timeout_secs, 20);
        assert_eq!(config.runtime.refresh_interval_secs, 60);
        assert_eq!(config.runtime.environment, Environment::Development);
        assert!(config.authorization.api_key.is_none());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUBSCRIPTION_AUTH__RUNTIME__REFRESH_INTERVAL_SECS", "15");
        env::set_var("SUBSCRIPTION_AUTH__RUNTIME__LOG_FORMAT", "json");
        env::set_var("SUBSCRIPTION_AUTH__STORAGE__STATE_PATH", "/var/lib/auth/state.yaml");
        env::set_var("SUBSCRIPTION_AUTH__AUTHORIZATION__API_KEY", "key-123");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.runtime.refresh_interval_secs, 15);
        assert_eq!(config.runtime.log_format, LogFormat::Json);
        assert_eq!(
            config.storage.state_path,
            PathBuf::from("/var/lib/auth/state.yaml")
        );
        assert!(config.authorization.api_key.is_some());
    }

    #[test]
    fn test_missing_base_url_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTHORIZATION__BASE_URL"))
        );
    }

    #[test]
    fn test_production_requires_https() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var(
            "SUBSCRIPTION_AUTH__AUTHORIZATION__BASE_URL",
            "http://auth.internal",
        );
        env::set_var("SUBSCRIPTION_AUTH__RUNTIME__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::BaseUrlMustBeHttps));
    }
}
