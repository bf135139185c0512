//! Payload capability for argument, result and exception structs.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::channel::Protocol;
use crate::error::ProtocolResult;

/// A struct that can be written to and read from a message channel.
///
/// `read` populates `self` in place, so a result value handed to a call is
/// filled once the reply has been decoded.
pub trait Payload {
    /// Serializes `self` through the channel's struct-write capability.
    fn write(&self, out: &mut dyn Protocol) -> ProtocolResult<()>;

    /// Replaces `self` with a struct read from the channel.
    fn read(&mut self, input: &mut dyn Protocol) -> ProtocolResult<()>;
}

/// Marker for serde types carried as JSON values on the channel.
///
/// ```rust
/// use callwire_protocol::JsonPayload;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct AddArgs {
///     a: i64,
///     b: i64,
/// }
///
/// impl JsonPayload for AddArgs {}
/// ```
pub trait JsonPayload: Serialize + DeserializeOwned {}

impl<T: JsonPayload> Payload for T {
    fn write(&self, out: &mut dyn Protocol) -> ProtocolResult<()> {
        let value = serde_json::to_value(self)?;
        out.write_struct(&value)
    }

    fn read(&mut self, input: &mut dyn Protocol) -> ProtocolResult<()> {
        let value = input.read_struct()?;
        *self = serde_json::from_value(value)?;
        Ok(())
    }
}

// Empty struct, also the result type of one-way calls.
impl JsonPayload for () {}
