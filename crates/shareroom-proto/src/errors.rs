//! Protocol error types.

use thiserror::Error;

/// Convenience result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Inbound envelope named an event outside the fixed enumeration.
    ///
    /// Per the client contract this is never fatal: the caller logs the name
    /// and drops the envelope, and dispatch of known kinds is unaffected.
    #[error("unknown event name: {name}")]
    UnknownEvent {
        /// Event name as it appeared on the wire.
        name: String,
    },

    /// Payload shape did not match the named event.
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload {
        /// Wire name of the event whose payload failed to decode.
        event: String,
        /// Decoder error description.
        reason: String,
    },

    /// CBOR encoding failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// CBOR decoding failed before the event name could be read.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Envelope exceeds the maximum permitted size.
    #[error("envelope too large: {size} bytes (max {max})")]
    EnvelopeTooLarge {
        /// Actual encoded size.
        size: usize,
        /// Permitted maximum.
        max: usize,
    },
}
