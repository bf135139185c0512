//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised by a message channel.
///
/// These are the transport/channel failures a client propagates verbatim.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// IO error during read/write/flush.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: u32, max: u32 },

    /// Incomplete message (connection closed before full message received).
    #[error("incomplete message: expected {expected} bytes, got {received}")]
    IncompleteMessage { expected: usize, received: usize },

    /// Empty message received.
    #[error("empty message")]
    EmptyMessage,

    /// Invalid protocol version in message.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    /// Message kind code outside the known set.
    #[error("invalid message kind code: {0}")]
    InvalidMessageKind(i8),

    /// Channel operations used out of order.
    #[error("invalid channel state: {0}")]
    InvalidState(&'static str),

    /// The call context was cancelled.
    #[error("call cancelled")]
    Cancelled,

    /// The call context deadline passed.
    #[error("call deadline exceeded")]
    DeadlineExceeded,
}
