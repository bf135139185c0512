//! Call error types.

use callwire_protocol::{ApplicationException, ExceptionKind, MessageKind, ProtocolError};
use thiserror::Error;

/// Result type for call operations.
pub type CallResult<T> = Result<T, CallError>;

/// Terminal outcome of a failed call.
///
/// Every variant stops the call immediately; nothing here is retried.
#[derive(Debug, Error)]
pub enum CallError {
    /// Read, write or flush failure from the channel, unchanged.
    #[error(transparent)]
    Channel(#[from] ProtocolError),

    /// The response names a different method than the request.
    #[error("{expected}: wrong method name, {actual}")]
    WrongMethodName { expected: String, actual: String },

    /// The response carries a different sequence id than the request.
    #[error("{method}: out of order sequence response")]
    BadSequenceId {
        method: String,
        expected: i32,
        actual: i32,
    },

    /// The response is neither a reply nor an exception.
    #[error("{method}: invalid message type")]
    InvalidMessageType { method: String, kind: MessageKind },

    /// Exception returned by the remote peer.
    #[error(transparent)]
    Remote(#[from] ApplicationException),
}

impl CallError {
    /// Creates a wrong method name error.
    pub fn wrong_method_name(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::WrongMethodName {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an out of order sequence error.
    pub fn bad_sequence_id(method: impl Into<String>, expected: i32, actual: i32) -> Self {
        Self::BadSequenceId {
            method: method.into(),
            expected,
            actual,
        }
    }

    /// Creates an invalid message type error.
    pub fn invalid_message_type(method: impl Into<String>, kind: MessageKind) -> Self {
        Self::InvalidMessageType {
            method: method.into(),
            kind,
        }
    }

    /// Application exception kind of this error.
    ///
    /// Protocol violations map to their well-known kind, remote exceptions to
    /// the kind decoded from the wire. Channel errors have none.
    pub fn exception_kind(&self) -> Option<ExceptionKind> {
        match self {
            Self::Channel(_) => None,
            Self::WrongMethodName { .. } => Some(ExceptionKind::WrongMethodName),
            Self::BadSequenceId { .. } => Some(ExceptionKind::BadSequenceId),
            Self::InvalidMessageType { .. } => Some(ExceptionKind::InvalidMessageType),
            Self::Remote(exception) => Some(exception.kind),
        }
    }

    /// Returns true for errors generated by this client while validating a
    /// response.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::WrongMethodName { .. }
                | Self::BadSequenceId { .. }
                | Self::InvalidMessageType { .. }
        )
    }
}
