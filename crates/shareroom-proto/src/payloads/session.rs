//! Session handshake payload types.
//!
//! The handshake is the only exchange outside the fixed event enumeration:
//! it establishes the session and delivers the server-assigned connection
//! identifier. It never reaches the dispatch registry.

use serde::{Deserialize, Serialize};

/// Client hello, sent as the first message after the transport connects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Protocol version the client speaks.
    pub version: u32,
}

/// Wire protocol version this crate implements.
pub const PROTOCOL_VERSION: u32 = 1;

impl Hello {
    /// Hello for the current protocol version.
    pub fn current() -> Self {
        Self { version: PROTOCOL_VERSION }
    }
}

/// Server reply completing the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloReply {
    /// Server-assigned identifier for this connection.
    ///
    /// This is the id other users see in room rosters, so the client can
    /// identify itself in a `roomInfo` snapshot.
    pub connection_id: String,
}
