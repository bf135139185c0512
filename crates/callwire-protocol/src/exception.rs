//! Remote exception value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::JsonPayload;

/// Well-known application exception codes.
///
/// Codes outside the known set are kept in [`ExceptionKind::Other`] so that a
/// decoded kind always round-trips to the exact number the peer sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ExceptionKind {
    Unknown,
    UnknownMethod,
    InvalidMessageType,
    WrongMethodName,
    BadSequenceId,
    MissingResult,
    InternalError,
    ProtocolError,
    InvalidTransform,
    InvalidProtocol,
    UnsupportedClientType,
    /// Any code not listed above.
    Other(i32),
}

impl ExceptionKind {
    /// Returns the numeric code.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::UnknownMethod => 1,
            Self::InvalidMessageType => 2,
            Self::WrongMethodName => 3,
            Self::BadSequenceId => 4,
            Self::MissingResult => 5,
            Self::InternalError => 6,
            Self::ProtocolError => 7,
            Self::InvalidTransform => 8,
            Self::InvalidProtocol => 9,
            Self::UnsupportedClientType => 10,
            Self::Other(code) => code,
        }
    }

    /// Returns a human-readable description of the exception kind.
    pub fn description(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown application exception",
            Self::UnknownMethod => "Unknown method",
            Self::InvalidMessageType => "Invalid message type",
            Self::WrongMethodName => "Wrong method name",
            Self::BadSequenceId => "Bad sequence identifier",
            Self::MissingResult => "Missing result",
            Self::InternalError => "Internal error",
            Self::ProtocolError => "Protocol error",
            Self::InvalidTransform => "Invalid transform",
            Self::InvalidProtocol => "Invalid protocol",
            Self::UnsupportedClientType => "Unsupported client type",
            Self::Other(_) => "Application-defined exception",
        }
    }
}

impl From<i32> for ExceptionKind {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::UnknownMethod,
            2 => Self::InvalidMessageType,
            3 => Self::WrongMethodName,
            4 => Self::BadSequenceId,
            5 => Self::MissingResult,
            6 => Self::InternalError,
            7 => Self::ProtocolError,
            8 => Self::InvalidTransform,
            9 => Self::InvalidProtocol,
            10 => Self::UnsupportedClientType,
            other => Self::Other(other),
        }
    }
}

impl From<ExceptionKind> for i32 {
    fn from(kind: ExceptionKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Structured failure returned by the remote peer instead of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationException {
    /// Exception kind code.
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: ExceptionKind,
    /// Message provided by the peer.
    #[serde(default)]
    pub message: String,
}

fn unknown_kind() -> ExceptionKind {
    ExceptionKind::Unknown
}

impl ApplicationException {
    /// Creates an application exception.
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Default for ApplicationException {
    fn default() -> Self {
        Self::new(ExceptionKind::Unknown, String::new())
    }
}

impl fmt::Display for ApplicationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote exception {}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for ApplicationException {}

impl JsonPayload for ApplicationException {}
