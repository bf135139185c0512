//! Request/response tracing.
//!
//! When a client has a [`DiagnosticsSink`] installed, every call produces one
//! [`CallTrace`] holding JSON snapshots of the argument and result payloads.
//! Snapshot encoding never affects the call: a payload that fails to encode is
//! replaced by a fixed placeholder.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

/// Placeholder recorded when the argument payload cannot be encoded.
pub const REQUEST_PLACEHOLDER: &str = "<request not encodable>";

/// Placeholder recorded when the result payload cannot be encoded.
pub const RESPONSE_PLACEHOLDER: &str = "<response not encodable>";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One traced call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTrace {
    /// When the call finished.
    pub timestamp: DateTime<Local>,
    /// Method name.
    pub method: String,
    /// Argument snapshot.
    pub request: String,
    /// Result snapshot, empty if no result was decoded.
    pub response: String,
}

impl CallTrace {
    /// Creates a trace stamped with the current local time.
    pub fn new(method: impl Into<String>, request: String, response: String) -> Self {
        Self {
            timestamp: Local::now(),
            method: method.into(),
            request,
            response,
        }
    }
}

impl fmt::Display for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}--[{}] req: {}, res: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.method,
            self.request,
            self.response
        )
    }
}

/// Destination for call traces.
pub trait DiagnosticsSink: Send + Sync {
    /// Records one finished call.
    fn record(&self, trace: &CallTrace);
}

/// Writes one line per call to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DiagnosticsSink for StdoutSink {
    fn record(&self, trace: &CallTrace) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not fail the call.
        let _ = writeln!(stdout, "{trace}");
    }
}

/// Emits one `tracing` event per call on the `callwire::trace` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn record(&self, trace: &CallTrace) {
        info!(
            target: "callwire::trace",
            method = %trace.method,
            request = %trace.request,
            response = %trace.response,
            "{trace}"
        );
    }
}

/// JSON snapshot of a payload, or `placeholder` if encoding fails.
pub fn snapshot<T: Serialize + ?Sized>(payload: &T, placeholder: &str) -> String {
    serde_json::to_string(payload).unwrap_or_else(|_| placeholder.to_string())
}
