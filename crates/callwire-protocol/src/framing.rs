//! Length-prefixed JSON message framing.
//!
//! Each message is one frame: a 4-byte big-endian length prefix followed by
//! a JSON object holding the envelope, any metadata headers and the struct
//! body:
//!
//! ```text
//! +----------------+-----------------------------------------------------+
//! | length (4 BE)  | {"version","method","kind","seq_id","headers","body"} |
//! +----------------+-----------------------------------------------------+
//! ```

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::channel::{HeaderWriter, Protocol};
use crate::context::CallContext;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{MessageHeader, MessageKind};
use crate::{MAX_MESSAGE_SIZE, PROTOCOL_VERSION};

/// One framed message as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Protocol version (always "1" for v1).
    pub version: String,
    /// Method name.
    pub method: String,
    /// Message kind code.
    pub kind: MessageKind,
    /// Sequence id.
    pub seq_id: i32,
    /// Metadata headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Struct body, absent for messages without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Frame {
    /// Creates a frame for `header` with no headers and no body.
    pub fn new(header: &MessageHeader) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            method: header.name.clone(),
            kind: header.kind,
            seq_id: header.seq_id,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Builder: set the struct body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Builder: add a metadata header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Returns the message-begin marker of this frame.
    pub fn header(&self) -> MessageHeader {
        MessageHeader::new(self.method.clone(), self.kind, self.seq_id)
    }
}

/// Encodes a frame to bytes with length prefix.
///
/// # Example
///
/// ```rust
/// use callwire_protocol::{encode_frame, Frame, MessageHeader};
///
/// let frame = Frame::new(&MessageHeader::call("ping", 1));
/// let bytes = encode_frame(&frame).unwrap();
/// assert!(bytes.len() > 4);
/// ```
pub fn encode_frame(frame: &Frame) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(frame)?;
    let len = json.len() as u32;

    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buffer = Vec::with_capacity(4 + json.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(&json);
    Ok(buffer)
}

/// Decodes one frame from bytes with length prefix.
pub fn decode_frame(data: &[u8]) -> ProtocolResult<Frame> {
    let Some(len_bytes) = data.first_chunk::<4>() else {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4,
            received: data.len(),
        });
    };
    let len = checked_len(u32::from_be_bytes(*len_bytes))?;

    let Some(json) = data.get(4..4 + len) else {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4 + len,
            received: data.len(),
        });
    };
    parse_frame(json)
}

fn checked_len(len: u32) -> ProtocolResult<usize> {
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(len as usize)
}

fn parse_frame(json: &[u8]) -> ProtocolResult<Frame> {
    let frame: Frame = serde_json::from_slice(json)?;
    if frame.version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(frame.version));
    }
    Ok(frame)
}

/// Message channel speaking length-prefixed JSON frames.
///
/// Writes are staged in memory and only reach `W` on
/// [`flush`](Protocol::flush). Reads pull one whole frame from `R` on each
/// [`read_message_begin`](Protocol::read_message_begin).
///
/// The channel supports outbound metadata headers; headers of the last frame
/// read are available through [`read_headers`](Self::read_headers).
pub struct JsonChannel<R, W> {
    reader: R,
    writer: W,
    write_headers: BTreeMap<String, String>,
    outgoing: Option<Frame>,
    pending: Vec<u8>,
    incoming: Option<Frame>,
    read_headers: BTreeMap<String, String>,
}

impl<R: Read, W: Write> JsonChannel<R, W> {
    /// Creates a channel reading from `reader` and writing to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            write_headers: BTreeMap::new(),
            outgoing: None,
            pending: Vec::new(),
            incoming: None,
            read_headers: BTreeMap::new(),
        }
    }

    /// Headers staged for the next outbound message.
    pub fn write_headers(&self) -> &BTreeMap<String, String> {
        &self.write_headers
    }

    /// Headers carried by the last message read.
    pub fn read_headers(&self) -> &BTreeMap<String, String> {
        &self.read_headers
    }

    /// Returns a reference to the underlying reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns a reference to the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Unwraps this channel, returning the reader and writer.
    ///
    /// Bytes staged but not flushed are discarded.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn read_frame(&mut self) -> ProtocolResult<Frame> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::IncompleteMessage {
                    expected: 4,
                    received: 0,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let len = checked_len(u32::from_be_bytes(len_buf))?;

        let mut payload = Vec::with_capacity(len);
        let received = (&mut self.reader).take(len as u64).read_to_end(&mut payload)?;
        if received < len {
            return Err(ProtocolError::IncompleteMessage {
                expected: 4 + len,
                received: 4 + received,
            });
        }

        parse_frame(&payload)
    }
}

impl<R: Read, W: Write> Protocol for JsonChannel<R, W> {
    fn write_message_begin(&mut self, header: &MessageHeader) -> ProtocolResult<()> {
        let mut frame = Frame::new(header);
        frame.headers = self.write_headers.clone();
        if let Some(abandoned) = self.outgoing.replace(frame) {
            trace!(method = %abandoned.method, seq_id = abandoned.seq_id, "unfinished frame dropped");
        }
        Ok(())
    }

    fn write_struct(&mut self, value: &Value) -> ProtocolResult<()> {
        let frame = self
            .outgoing
            .as_mut()
            .ok_or(ProtocolError::InvalidState("struct written outside a message"))?;
        frame.body = Some(value.clone());
        Ok(())
    }

    fn write_message_end(&mut self) -> ProtocolResult<()> {
        let frame = self
            .outgoing
            .take()
            .ok_or(ProtocolError::InvalidState("message end without begin"))?;
        let bytes = encode_frame(&frame)?;
        trace!(method = %frame.method, seq_id = frame.seq_id, len = bytes.len(), "frame staged");
        self.pending.extend_from_slice(&bytes);
        Ok(())
    }

    fn flush(&mut self, ctx: &CallContext) -> ProtocolResult<()> {
        // Staged bytes belong to this flush only, whether or not it succeeds.
        let bytes = std::mem::take(&mut self.pending);
        ctx.check()?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_message_begin(&mut self) -> ProtocolResult<MessageHeader> {
        if let Some(abandoned) = self.incoming.take() {
            trace!(method = %abandoned.method, seq_id = abandoned.seq_id, "unfinished frame skipped");
        }
        let mut frame = self.read_frame()?;
        trace!(method = %frame.method, seq_id = frame.seq_id, kind = %frame.kind, "frame received");
        let header = frame.header();
        self.read_headers = std::mem::take(&mut frame.headers);
        self.incoming = Some(frame);
        Ok(header)
    }

    fn read_struct(&mut self) -> ProtocolResult<Value> {
        self.incoming
            .as_mut()
            .ok_or(ProtocolError::InvalidState("struct read outside a message"))?
            .body
            .take()
            .ok_or(ProtocolError::InvalidState("message carries no struct"))
    }

    fn read_message_end(&mut self) -> ProtocolResult<()> {
        self.incoming
            .take()
            .map(|_| ())
            .ok_or(ProtocolError::InvalidState("message end without begin"))
    }

    fn header_writer(&mut self) -> Option<&mut dyn HeaderWriter> {
        Some(self)
    }
}

impl<R, W> HeaderWriter for JsonChannel<R, W> {
    fn clear_write_headers(&mut self) {
        self.write_headers.clear();
    }

    fn set_write_header(&mut self, key: &str, value: &str) {
        self.write_headers.insert(key.to_string(), value.to_string());
    }
}
