//! Message channel capabilities for callwire.
//!
//! This crate defines what a call-correlating client consumes from the layers
//! below it:
//!
//! - [`Protocol`]: framed message begin/end, struct read/write and flush
//! - [`HeaderWriter`]: optional outbound metadata headers
//! - [`Payload`]: argument, result and exception structs
//! - [`CallContext`]: headers to propagate plus a cancellation/deadline signal
//!
//! It also ships [`JsonChannel`], a channel speaking length-prefixed JSON
//! frames over any `Read`/`Write` pair.
//!
//! # Example
//!
//! ```rust
//! use callwire_protocol::{CallContext, JsonChannel, MessageHeader, Protocol};
//! use serde_json::json;
//!
//! let mut channel = JsonChannel::new(std::io::empty(), Vec::new());
//! channel.write_message_begin(&MessageHeader::call("ping", 1)).unwrap();
//! channel.write_struct(&json!({})).unwrap();
//! channel.write_message_end().unwrap();
//! channel.flush(&CallContext::new()).unwrap();
//! assert!(!channel.writer().is_empty());
//! ```

mod channel;
mod context;
mod error;
mod exception;
mod framing;
mod message;
mod payload;

pub use channel::{HeaderWriter, Protocol};
pub use context::{CallContext, CancelHandle};
pub use error::{ProtocolError, ProtocolResult};
pub use exception::{ApplicationException, ExceptionKind};
pub use framing::{decode_frame, encode_frame, Frame, JsonChannel};
pub use message::{MessageHeader, MessageKind};
pub use payload::{JsonPayload, Payload};

/// Protocol version constant.
pub const PROTOCOL_VERSION: &str = "1";

/// Maximum frame size (1 MB).
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;
