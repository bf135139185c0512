//! Request/response call correlation over a message channel.
//!
//! A [`StandardClient`] turns a remote-procedure invocation (method name,
//! argument struct, result struct) into a CALL message on its output channel
//! and, for two-way calls, validates and decodes the matching response from
//! its input channel.
//!
//! Responses are checked in a fixed order: method name, then sequence id,
//! then message kind. A mismatch is reported as a [`CallError`] and the
//! result is left untouched. Exceptions declared by the peer come back as
//! [`CallError::Remote`].
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use callwire_client::{Client, StandardClient};
//! use callwire_protocol::{
//!     encode_frame, CallContext, Frame, JsonChannel, JsonPayload, MessageHeader,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AddArgs { a: i64, b: i64 }
//! impl JsonPayload for AddArgs {}
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AddResult { sum: i64 }
//! impl JsonPayload for AddResult {}
//!
//! let reply = Frame::new(&MessageHeader::reply("add", 1)).with_body(json!({"sum": 5}));
//! let input = JsonChannel::new(Cursor::new(encode_frame(&reply).unwrap()), std::io::sink());
//! let output = JsonChannel::new(std::io::empty(), Vec::new());
//!
//! let mut client = StandardClient::new(input, output);
//! let mut result = AddResult::default();
//! client
//!     .call(&CallContext::new(), "add", &AddArgs { a: 2, b: 3 }, Some(&mut result))
//!     .unwrap();
//! assert_eq!(result.sum, 5);
//! ```

mod client;
pub mod config;
pub mod diagnostics;
mod error;
pub mod logging;
mod sequence;

pub use client::{Client, StandardClient};
pub use config::{
    ClientConfig, ConfigError, LogFormat, LogLevel, LogSettings, TraceSettings, TraceSinkKind,
};
pub use diagnostics::{CallTrace, DiagnosticsSink, LogSink, StdoutSink};
pub use error::{CallError, CallResult};
pub use logging::{init_logging, LoggingError};
pub use sequence::SequenceAllocator;
