//! Room membership and signaling payload types.
//!
//! These payloads drive the join/leave flow: the authoritative roster
//! snapshots the server pushes, the join request the client sends, and the
//! invitation/signaling messages exchanged between peers through the server.

use serde::{Deserialize, Serialize};

/// A user present in a room.
///
/// The `id` is the server-assigned connection identifier of that user's
/// session, so the local client recognizes itself by comparing against its
/// own connection id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Connection identifier of the user's session.
    pub id: String,
    /// Display name chosen at join time.
    pub username: String,
}

/// Authoritative room snapshot sent on successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Identifier of the joined room.
    pub room_id: String,
    /// Whether the room is private (invitation/link only).
    pub is_private: bool,
    /// Full user list at the time of joining.
    pub users: Vec<User>,
}

/// Full roster replacement carried by `userJoined` / `userLeft`.
///
/// The user list is an authoritative snapshot, not a delta: the receiver
/// replaces its membership wholesale. `username` names the user that
/// triggered the update, when the server includes it, and only feeds the
/// notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUpdate {
    /// Complete replacement user list.
    pub users: Vec<User>,
    /// Display name of the joining/leaving user, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Error message carried by `roomJoinError` / `inviteError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// Human-readable error description from the server.
    pub message: String,
}

/// Invitation to a room, relayed from another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInvitation {
    /// The inviting user.
    pub from: Inviter,
    /// Room the invitation refers to.
    pub room_id: String,
}

/// Identity of an inviting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inviter {
    /// Display name of the inviter.
    pub username: String,
}

/// Peer-to-peer signal relayed by the server.
///
/// The signal body is opaque to this client: it is produced and consumed by
/// the media/negotiation layer, which is outside this protocol's contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerSignal {
    /// Connection id of the originating peer.
    pub from: String,
    /// Opaque signal body.
    pub signal: ciborium::Value,
}

/// Join request sent by the client.
///
/// Transient: the coordinator does not retain it after sending. A missing
/// `room_id` asks the server to create a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Room to join. `None` to create a new room.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// Display name to join under.
    pub username: String,
    /// Requested privacy for a newly-created room.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// Outbound peer-to-peer signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundSignal {
    /// Connection id of the target peer.
    pub to: String,
    /// Opaque signal body.
    pub signal: ciborium::Value,
    /// Connection id of the local session.
    pub from: String,
}

/// Invitation request targeting another connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    /// Room the target is invited to.
    pub room_id: String,
    /// Connection id of the invited client's session.
    pub target_socket_id: String,
}
