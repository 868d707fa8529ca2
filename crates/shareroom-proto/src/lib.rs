//! Wire model for the shareroom realtime protocol.
//!
//! The realtime protocol is a set of named events with structured payloads:
//! the client sends requests ([`ClientRequest`]) and the server pushes events
//! ([`ServerEvent`]) from a fixed enumeration of kinds ([`EventKind`]).
//! Payloads are CBOR-encoded inside a small envelope carrying the event name
//! (see [`envelope`]), so the receiver can route by name without guessing at
//! payload shape.
//!
//! # Components
//!
//! - [`EventKind`]: closed enumeration of inbound event kinds
//! - [`ServerEvent`]: inbound event payloads, one variant per kind
//! - [`ClientRequest`]: outbound operations
//! - [`envelope`]: encode/decode of the `{event, data}` wire envelope
//!
//! # Invariants
//!
//! Each [`ServerEvent`] variant maps to exactly one [`EventKind`] (enforced
//! by match exhaustiveness in [`ServerEvent::kind`]). Round-trip encoding
//! must produce identical values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod envelope;
mod errors;
mod event;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use event::EventKind;
pub use payloads::{ClientRequest, ServerEvent};
