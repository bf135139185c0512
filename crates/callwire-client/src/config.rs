//! Client configuration.
//!
//! Settings are read from TOML:
//!
//! ```toml
//! [trace]
//! enabled = true
//! sink = "log"        # or "stdout"
//!
//! [log]
//! level = "debug"
//! format = "compact"  # "pretty", "compact" or "json"
//! filter = "callwire=trace"
//! ```
//!
//! Every field is optional; missing sections fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for a callwire client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request/response tracing.
    pub trace: TraceSettings,

    /// Log output.
    pub log: LogSettings,
}

/// Per-client call tracing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Record one trace line per call.
    pub enabled: bool,

    /// Where trace lines go.
    pub sink: TraceSinkKind,
}

/// Destination for trace lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSinkKind {
    /// Standard output.
    #[default]
    Stdout,
    /// `tracing` events on the `callwire::trace` target.
    Log,
}

/// Log subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default level when `RUST_LOG` is not set.
    pub level: LogLevel,

    /// Output format.
    pub format: LogFormat,

    /// Custom env filter directive (overrides `level` if set).
    pub filter: Option<String>,

    /// Include file/line information.
    pub include_location: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            filter: None,
            include_location: false,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable multi-line format.
    #[default]
    Pretty,
    /// Single-line format.
    Compact,
    /// JSON lines.
    Json,
}

impl ClientConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Builder: enable tracing to `sink`.
    pub fn with_trace(mut self, sink: TraceSinkKind) -> Self {
        self.trace = TraceSettings {
            enabled: true,
            sink,
        };
        self
    }
}
