//! CBOR-encoded protocol payloads.
//!
//! Every realtime message is a named event with a structured payload. The
//! name travels in the envelope (see [`crate::envelope`]); the payload is
//! serialized without a variant tag, since the name already identifies the
//! shape. CBOR keeps field names on the wire, which matches the original
//! JSON-ish protocol and needs no code generation.
//!
//! # Invariants
//!
//! - Name Uniqueness: each [`ServerEvent`] variant maps to exactly one
//!   [`EventKind`], and each [`ClientRequest`] variant to exactly one wire
//!   name. Enforced by match exhaustiveness.
//! - No Variant Tag: the payload bytes never carry a discriminator. The
//!   envelope's event name is the single source of payload identity, so a
//!   mismatched name/payload pair fails to decode instead of silently
//!   reinterpreting.

pub mod room;
pub mod session;
pub mod stream;

use crate::event::EventKind;

/// Inbound server event, one variant per [`EventKind`].
///
/// Server-reported failures (`roomJoinError`, `inviteError`) are ordinary
/// variants here: they travel the same dispatch path as successes and are
/// never represented as a Rust error.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Authoritative room snapshot confirming a join.
    RoomInfo(room::RoomInfo),
    /// A user joined; carries the full replacement roster.
    UserJoined(room::RosterUpdate),
    /// Chat message.
    Message(stream::ChatMessage),
    /// File-share notice.
    NewFile(stream::FileShareNotice),
    /// A user left; carries the full replacement roster.
    UserLeft(room::RosterUpdate),
    /// Peer-to-peer signal relayed from another client.
    P2pSignal(room::PeerSignal),
    /// Server rejected a join request.
    RoomJoinError(room::ErrorNotice),
    /// Invitation to a room from another user.
    RoomInvitation(room::RoomInvitation),
    /// Server rejected an invitation attempt.
    InviteError(room::ErrorNotice),
}

impl ServerEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::RoomInfo(_) => EventKind::RoomInfo,
            ServerEvent::UserJoined(_) => EventKind::UserJoined,
            ServerEvent::Message(_) => EventKind::Message,
            ServerEvent::NewFile(_) => EventKind::NewFile,
            ServerEvent::UserLeft(_) => EventKind::UserLeft,
            ServerEvent::P2pSignal(_) => EventKind::P2pSignal,
            ServerEvent::RoomJoinError(_) => EventKind::RoomJoinError,
            ServerEvent::RoomInvitation(_) => EventKind::RoomInvitation,
            ServerEvent::InviteError(_) => EventKind::InviteError,
        }
    }
}

/// Outbound client operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    /// Join a room, creating one server-side when no id is given.
    JoinRoom(room::JoinRequest),
    /// Send a chat message to a room.
    SendMessage(stream::OutboundMessage),
    /// Share uploaded-file metadata with a room.
    FileInfo(stream::OutboundFileInfo),
    /// Relay a peer-to-peer signal to another client.
    P2pSignal(room::OutboundSignal),
    /// Invite another connected client to a room.
    InviteToRoom(room::InviteRequest),
    /// Session handshake; first message after the transport connects.
    Hello(session::Hello),
}

impl ClientRequest {
    /// Wire name of this request.
    pub fn name(&self) -> &'static str {
        match self {
            ClientRequest::JoinRoom(_) => "joinRoom",
            ClientRequest::SendMessage(_) => "sendMessage",
            ClientRequest::FileInfo(_) => "fileInfo",
            ClientRequest::P2pSignal(_) => "p2pSignal",
            ClientRequest::InviteToRoom(_) => "inviteToRoom",
            ClientRequest::Hello(_) => "hello",
        }
    }
}
