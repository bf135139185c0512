//! Message channel capabilities.
//!
//! A channel is the message-oriented read/write abstraction over a byte
//! transport. The wire encoding behind it is up to the implementation;
//! [`JsonChannel`](crate::JsonChannel) is the one shipped with this crate.

use serde_json::Value;

use crate::context::CallContext;
use crate::error::ProtocolResult;
use crate::message::MessageHeader;

/// Framed message read/write operations.
///
/// Failures from any of these operations are channel errors: callers
/// propagate them unchanged and treat the channel as consumed past that point.
pub trait Protocol {
    /// Emits a message-begin marker.
    fn write_message_begin(&mut self, header: &MessageHeader) -> ProtocolResult<()>;

    /// Writes one struct as part of the current message.
    fn write_struct(&mut self, value: &Value) -> ProtocolResult<()>;

    /// Emits a message-end marker.
    fn write_message_end(&mut self) -> ProtocolResult<()>;

    /// Pushes buffered bytes to the transport.
    ///
    /// Implementations must return promptly with an error once the context
    /// is cancelled or past its deadline.
    fn flush(&mut self, ctx: &CallContext) -> ProtocolResult<()>;

    /// Reads a message-begin marker.
    fn read_message_begin(&mut self) -> ProtocolResult<MessageHeader>;

    /// Reads one struct from the current message.
    fn read_struct(&mut self) -> ProtocolResult<Value>;

    /// Consumes the message-end marker.
    fn read_message_end(&mut self) -> ProtocolResult<()>;

    /// Optional outbound metadata-header capability.
    fn header_writer(&mut self) -> Option<&mut dyn HeaderWriter> {
        None
    }
}

/// Outbound metadata headers staged for the next message.
pub trait HeaderWriter {
    /// Drops every staged header.
    fn clear_write_headers(&mut self);

    /// Stages a header, replacing any previous value for `key`.
    fn set_write_header(&mut self, key: &str, value: &str);
}

impl<P: Protocol + ?Sized> Protocol for &mut P {
    fn write_message_begin(&mut self, header: &MessageHeader) -> ProtocolResult<()> {
        (**self).write_message_begin(header)
    }

    fn write_struct(&mut self, value: &Value) -> ProtocolResult<()> {
        (**self).write_struct(value)
    }

    fn write_message_end(&mut self) -> ProtocolResult<()> {
        (**self).write_message_end()
    }

    fn flush(&mut self, ctx: &CallContext) -> ProtocolResult<()> {
        (**self).flush(ctx)
    }

    fn read_message_begin(&mut self) -> ProtocolResult<MessageHeader> {
        (**self).read_message_begin()
    }

    fn read_struct(&mut self) -> ProtocolResult<Value> {
        (**self).read_struct()
    }

    fn read_message_end(&mut self) -> ProtocolResult<()> {
        (**self).read_message_end()
    }

    fn header_writer(&mut self) -> Option<&mut dyn HeaderWriter> {
        (**self).header_writer()
    }
}

impl<P: Protocol + ?Sized> Protocol for Box<P> {
    fn write_message_begin(&mut self, header: &MessageHeader) -> ProtocolResult<()> {
        (**self).write_message_begin(header)
    }

    fn write_struct(&mut self, value: &Value) -> ProtocolResult<()> {
        (**self).write_struct(value)
    }

    fn write_message_end(&mut self) -> ProtocolResult<()> {
        (**self).write_message_end()
    }

    fn flush(&mut self, ctx: &CallContext) -> ProtocolResult<()> {
        (**self).flush(ctx)
    }

    fn read_message_begin(&mut self) -> ProtocolResult<MessageHeader> {
        (**self).read_message_begin()
    }

    fn read_struct(&mut self) -> ProtocolResult<Value> {
        (**self).read_struct()
    }

    fn read_message_end(&mut self) -> ProtocolResult<()> {
        (**self).read_message_end()
    }

    fn header_writer(&mut self) -> Option<&mut dyn HeaderWriter> {
        (**self).header_writer()
    }
}
