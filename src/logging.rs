//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence over the configured filter. Output goes to
//! stderr, human-readable or one JSON object per line.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, RuntimeConfig};

/// Install the global subscriber.
///
/// # Errors
/// Returns `TryInitError` if a global subscriber is already installed.
pub fn init(config: &RuntimeConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init(),
    }
}
