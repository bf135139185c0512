//! Log subscriber setup.
//!
//! The library only emits `tracing` events. Applications embedding a client
//! call [`init_logging`] once at startup, or install their own subscriber.
//!
//! ```ignore
//! use callwire_client::{ClientConfig, init_logging};
//!
//! let config = ClientConfig::load_from("callwire.toml")?;
//! init_logging(&config.log)?;
//! ```

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogFormat, LogSettings};

/// Errors that can occur during logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to set global subscriber.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Builds the env filter: an explicit directive wins, then `RUST_LOG`, then
/// `callwire=<level>`.
fn env_filter(settings: &LogSettings) -> Result<EnvFilter, LoggingError> {
    if let Some(filter) = &settings.filter {
        return Ok(EnvFilter::try_new(filter)?);
    }
    let level = tracing::Level::from(settings.level);
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("callwire={level}"))))
}

/// Installs a global subscriber configured by `settings`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or the filter
/// directive is invalid.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = env_filter(settings)?;
    let location = settings.include_location;
    let registry = tracing_subscriber::registry().with(filter);

    match settings.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_file(location)
                .with_line_number(location);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_file(location)
                .with_line_number(location);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_file(location)
                .with_line_number(location);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
    }

    Ok(())
}
