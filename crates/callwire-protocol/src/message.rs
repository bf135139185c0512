//! Message envelope types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Classification of a message on the wire.
///
/// Clients only ever send [`MessageKind::Call`]; the only acceptable inbound
/// kinds for a call are [`MessageKind::Reply`] and [`MessageKind::Exception`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum MessageKind {
    /// Request expecting a response.
    Call = 1,
    /// Normal response carrying a result struct.
    Reply = 2,
    /// Response carrying a remote exception.
    Exception = 3,
    /// Request for which no response is produced.
    Oneway = 4,
}

impl MessageKind {
    /// Returns the numeric wire code.
    pub fn code(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for MessageKind {
    type Error = ProtocolError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Call),
            2 => Ok(Self::Reply),
            3 => Ok(Self::Exception),
            4 => Ok(Self::Oneway),
            other => Err(ProtocolError::InvalidMessageKind(other)),
        }
    }
}

impl From<MessageKind> for i8 {
    fn from(kind: MessageKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "CALL",
            Self::Reply => "REPLY",
            Self::Exception => "EXCEPTION",
            Self::Oneway => "ONEWAY",
        };
        f.write_str(name)
    }
}

/// Message-begin marker: method name, kind and sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHeader {
    /// Method name.
    pub name: String,
    /// Message kind.
    pub kind: MessageKind,
    /// Correlation id chosen by the caller and echoed by the peer.
    pub seq_id: i32,
}

impl MessageHeader {
    /// Creates a header.
    pub fn new(name: impl Into<String>, kind: MessageKind, seq_id: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            seq_id,
        }
    }

    /// Creates a CALL header.
    pub fn call(name: impl Into<String>, seq_id: i32) -> Self {
        Self::new(name, MessageKind::Call, seq_id)
    }

    /// Creates a REPLY header.
    pub fn reply(name: impl Into<String>, seq_id: i32) -> Self {
        Self::new(name, MessageKind::Reply, seq_id)
    }

    /// Creates an EXCEPTION header.
    pub fn exception(name: impl Into<String>, seq_id: i32) -> Self {
        Self::new(name, MessageKind::Exception, seq_id)
    }

    /// Creates a ONEWAY header.
    pub fn oneway(name: impl Into<String>, seq_id: i32) -> Self {
        Self::new(name, MessageKind::Oneway, seq_id)
    }
}
