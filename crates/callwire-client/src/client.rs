//! Call correlation over a pair of message channels.
//!
//! A call runs through these states:
//!
//! ```text
//! ALLOCATED -> SENT -> ONE_WAY_DONE
//!                   -> AWAITING_REPLY -> REPLY_DECODED
//!                                     -> EXCEPTION_DECODED
//!                                     -> PROTOCOL_ERROR
//! ```
//!
//! Send fully completes, through flush, before anything is read. Any error
//! ends the call; there is no retry transition.

use std::sync::Arc;

use callwire_protocol::{
    ApplicationException, CallContext, MessageHeader, MessageKind, Payload, Protocol,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, TraceSinkKind};
use crate::diagnostics::{
    CallTrace, DiagnosticsSink, LogSink, REQUEST_PLACEHOLDER, RESPONSE_PLACEHOLDER, StdoutSink,
    snapshot,
};
use crate::error::{CallError, CallResult};
use crate::sequence::SequenceAllocator;

/// A logical remote-procedure invocation.
pub trait Client {
    /// Sends `args` as a call to `method` and, unless `result` is `None`,
    /// decodes the reply into `result`.
    ///
    /// Passing `None` makes the call one-way: success is returned as soon as
    /// the request is flushed and nothing is read from the input channel.
    fn call<A, R>(
        &mut self,
        ctx: &CallContext,
        method: &str,
        args: &A,
        result: Option<&mut R>,
    ) -> CallResult<()>
    where
        A: Payload + Serialize + ?Sized,
        R: Payload + Serialize;

    /// Sends a one-way call.
    fn oneway<A>(&mut self, ctx: &CallContext, method: &str, args: &A) -> CallResult<()>
    where
        A: Payload + Serialize + ?Sized,
    {
        self.call::<A, ()>(ctx, method, args, None)
    }
}

/// Client using the standard message format: begin, struct, end, flush.
///
/// The client owns its channels for its whole lifetime and never closes them.
/// [`Client::call`] takes `&mut self`, so one instance cannot have
/// overlapping calls in flight; the sequence counter is the only state
/// guarded for shared access.
///
/// # Example
///
/// ```rust
/// use callwire_client::{Client, StandardClient};
/// use callwire_protocol::{CallContext, JsonChannel};
///
/// let input = JsonChannel::new(std::io::empty(), std::io::sink());
/// let output = JsonChannel::new(std::io::empty(), Vec::new());
/// let mut client = StandardClient::new(input, output);
///
/// client.oneway(&CallContext::new(), "log", &()).unwrap();
/// assert_eq!(client.sequence().last(), 1);
/// ```
pub struct StandardClient<I, O> {
    sequence: SequenceAllocator,
    input: I,
    output: O,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl<I: Protocol, O: Protocol> StandardClient<I, O> {
    /// Creates a client reading replies from `input` and writing calls to
    /// `output`. Tracing is off.
    pub fn new(input: I, output: O) -> Self {
        Self {
            sequence: SequenceAllocator::new(),
            input,
            output,
            diagnostics: None,
        }
    }

    /// Creates a client with tracing set up from `config`.
    pub fn with_config(input: I, output: O, config: &ClientConfig) -> Self {
        let client = Self::new(input, output);
        if !config.trace.enabled {
            return client;
        }
        match config.trace.sink {
            TraceSinkKind::Stdout => client.with_diagnostics(Arc::new(StdoutSink)),
            TraceSinkKind::Log => client.with_diagnostics(Arc::new(LogSink)),
        }
    }

    /// Builder: install a diagnostics sink, enabling tracing.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Builder: replace the sequence allocator.
    pub fn with_sequence(mut self, sequence: SequenceAllocator) -> Self {
        self.sequence = sequence;
        self
    }

    /// Returns true if calls are traced.
    pub fn is_tracing(&self) -> bool {
        self.diagnostics.is_some()
    }

    /// Returns the sequence allocator.
    pub fn sequence(&self) -> &SequenceAllocator {
        &self.sequence
    }

    /// Returns the input channel.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Returns the output channel.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Unwraps this client, returning the input and output channels.
    pub fn into_parts(self) -> (I, O) {
        (self.input, self.output)
    }

    /// Writes a CALL message for `method` with `args` and flushes it.
    ///
    /// When the output channel supports metadata headers, previously staged
    /// headers are cleared and replaced by the context's write headers; keys
    /// without a value are skipped. The first failing step aborts the rest
    /// and its error is returned as is.
    pub fn send<A>(
        &mut self,
        ctx: &CallContext,
        seq_id: i32,
        method: &str,
        args: &A,
    ) -> CallResult<()>
    where
        A: Payload + ?Sized,
    {
        if let Some(headers) = self.output.header_writer() {
            headers.clear_write_headers();
            for key in ctx.write_header_keys() {
                if let Some(value) = ctx.header(key) {
                    headers.set_write_header(key, value);
                }
            }
        }

        self.output
            .write_message_begin(&MessageHeader::call(method, seq_id))?;
        args.write(&mut self.output)?;
        self.output.write_message_end()?;
        self.output.flush(ctx)?;

        debug!(method, seq_id, "call sent");
        Ok(())
    }

    /// Reads the response to call `seq_id` of `method` into `result`.
    ///
    /// The envelope is checked for method name, then sequence id, then kind.
    /// An EXCEPTION reply is decoded and returned as [`CallError::Remote`].
    pub fn receive<R>(&mut self, seq_id: i32, method: &str, result: &mut R) -> CallResult<()>
    where
        R: Payload + ?Sized,
    {
        let header = self.input.read_message_begin()?;

        if header.name != method {
            warn!(expected = method, actual = %header.name, "wrong method name in response");
            return Err(CallError::wrong_method_name(method, header.name));
        }
        if header.seq_id != seq_id {
            warn!(
                method,
                expected = seq_id,
                actual = header.seq_id,
                "out of order sequence response"
            );
            return Err(CallError::bad_sequence_id(method, seq_id, header.seq_id));
        }

        match header.kind {
            MessageKind::Reply => {}
            MessageKind::Exception => {
                let mut exception = ApplicationException::default();
                exception.read(&mut self.input)?;
                self.input.read_message_end()?;
                debug!(method, seq_id, code = exception.kind.code(), "remote exception");
                return Err(CallError::Remote(exception));
            }
            kind => {
                warn!(method, %kind, "invalid message type in response");
                return Err(CallError::invalid_message_type(method, kind));
            }
        }

        result.read(&mut self.input)?;
        self.input.read_message_end()?;

        debug!(method, seq_id, "reply decoded");
        Ok(())
    }

    fn exchange<A, R>(
        &mut self,
        ctx: &CallContext,
        seq_id: i32,
        method: &str,
        args: &A,
        result: Option<&mut R>,
        response: &mut String,
    ) -> CallResult<()>
    where
        A: Payload + ?Sized,
        R: Payload + Serialize,
    {
        self.send(ctx, seq_id, method, args)?;

        let Some(result) = result else {
            return Ok(());
        };

        self.receive(seq_id, method, &mut *result)?;

        if self.is_tracing() {
            *response = snapshot(&*result, RESPONSE_PLACEHOLDER);
        }
        Ok(())
    }
}

impl<I: Protocol, O: Protocol> Client for StandardClient<I, O> {
    fn call<A, R>(
        &mut self,
        ctx: &CallContext,
        method: &str,
        args: &A,
        result: Option<&mut R>,
    ) -> CallResult<()>
    where
        A: Payload + Serialize + ?Sized,
        R: Payload + Serialize,
    {
        let seq_id = self.sequence.next_id();

        let request = if self.is_tracing() {
            snapshot(args, REQUEST_PLACEHOLDER)
        } else {
            String::new()
        };
        let mut response = String::new();

        let outcome = self.exchange(ctx, seq_id, method, args, result, &mut response);

        if let Some(sink) = &self.diagnostics {
            sink.record(&CallTrace::new(method, request, response));
        }

        outcome
    }
}
