//! Closed enumeration of inbound event kinds.

use std::{fmt, str::FromStr};

use crate::errors::ProtocolError;

/// Kind of an inbound server event.
///
/// This is the fixed, closed set the dispatch registry is keyed by. Wire
/// names are the camelCase strings the server uses; they exist only at the
/// codec boundary ([`EventKind::as_str`] / [`FromStr`]). A name outside this
/// set is rejected at decode time, never surfaced as a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Authoritative room snapshot confirming a join.
    RoomInfo,
    /// A user joined the current room.
    UserJoined,
    /// Chat message.
    Message,
    /// File-share notice.
    NewFile,
    /// A user left the current room.
    UserLeft,
    /// Peer-to-peer signaling relay.
    P2pSignal,
    /// Server rejected a join request.
    RoomJoinError,
    /// Invitation to another room.
    RoomInvitation,
    /// Server rejected an invitation attempt.
    InviteError,
}

impl EventKind {
    /// Every kind, in wire-protocol declaration order.
    pub const ALL: [EventKind; 9] = [
        EventKind::RoomInfo,
        EventKind::UserJoined,
        EventKind::Message,
        EventKind::NewFile,
        EventKind::UserLeft,
        EventKind::P2pSignal,
        EventKind::RoomJoinError,
        EventKind::RoomInvitation,
        EventKind::InviteError,
    ];

    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RoomInfo => "roomInfo",
            EventKind::UserJoined => "userJoined",
            EventKind::Message => "message",
            EventKind::NewFile => "newFile",
            EventKind::UserLeft => "userLeft",
            EventKind::P2pSignal => "p2pSignal",
            EventKind::RoomJoinError => "roomJoinError",
            EventKind::RoomInvitation => "roomInvitation",
            EventKind::InviteError => "inviteError",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownEvent { name: s.to_string() })
    }
}
