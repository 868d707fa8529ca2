//! Room membership state machine.
//!
//! Tracks the join flow (`NotJoined → Joining → Joined`) and the
//! authoritative membership snapshot the server reports. Membership is
//! replaced wholesale on every roster event, never diffed: the server owns
//! the truth and this machine only mirrors its latest word.

use shareroom_proto::{ServerEvent, payloads::room::User};

/// Join state of the room session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomPhase {
    /// Not in a room and no join in flight.
    #[default]
    NotJoined,
    /// Join request sent, awaiting the server's answer.
    Joining,
    /// In a room with an authoritative membership snapshot.
    Joined,
}

/// Authoritative membership of the joined room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    /// Identifier of the room.
    pub room_id: String,
    /// Whether the room is private.
    pub is_private: bool,
    /// Users currently present, in server-reported order.
    pub users: Vec<User>,
}

/// The local user's identity inside the room.
///
/// Pairs the connection id the server assigned with the username supplied in
/// the join request, so the UI can tell "own" entries apart in rosters and
/// streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Connection id of the local session.
    pub id: String,
    /// Username from the original join request.
    pub username: String,
}

/// Room session state machine.
///
/// Mutated only by inbound events; completion of a join is observed through
/// the events the server dispatches, never through a return value.
#[derive(Debug, Default)]
pub struct RoomSession {
    phase: RoomPhase,
    membership: Option<RoomMembership>,
    current_user: Option<CurrentUser>,
    /// Username from the in-flight join request, consumed on `roomInfo`.
    pending_username: Option<String>,
}

impl RoomSession {
    /// Create a session that has not joined anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current join phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Membership snapshot of the joined room, if any.
    pub fn membership(&self) -> Option<&RoomMembership> {
        self.membership.as_ref()
    }

    /// The local user's identity, once joined.
    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    /// Whether the session is currently in a room.
    pub fn is_joined(&self) -> bool {
        self.phase == RoomPhase::Joined
    }

    /// Record that a join request is in flight.
    ///
    /// Called by the coordinator immediately before sending `joinRoom`; the
    /// username is held until the `roomInfo` answer pairs it with the
    /// connection id.
    pub fn begin_join(&mut self, username: &str) {
        self.phase = RoomPhase::Joining;
        self.pending_username = Some(username.to_string());
    }

    /// Discard all room state.
    ///
    /// The coordinator is not responsible for calling this on disconnect;
    /// per the session contract, the owning UI decides when stale membership
    /// is torn down.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Apply an inbound event.
    ///
    /// `connection_id` is the local session's identifier at the time the
    /// event arrived; it becomes the current user's id on `roomInfo`.
    pub fn handle_event(&mut self, connection_id: Option<&str>, event: &ServerEvent) {
        match event {
            ServerEvent::RoomInfo(info) => {
                self.phase = RoomPhase::Joined;
                self.membership = Some(RoomMembership {
                    room_id: info.room_id.clone(),
                    is_private: info.is_private,
                    users: info.users.clone(),
                });
                self.current_user = match (connection_id, self.pending_username.take()) {
                    (Some(id), Some(username)) => {
                        Some(CurrentUser { id: id.to_string(), username })
                    },
                    _ => None,
                };
            },
            ServerEvent::RoomJoinError(error) => {
                if self.phase == RoomPhase::Joining {
                    self.phase = RoomPhase::NotJoined;
                    self.membership = None;
                    self.pending_username = None;
                } else {
                    // A join error after being joined is display-only; the
                    // established membership stands.
                    tracing::debug!(message = %error.message, "join error outside Joining");
                }
            },
            ServerEvent::UserJoined(update) | ServerEvent::UserLeft(update) => {
                if self.phase == RoomPhase::Joined
                    && let Some(membership) = self.membership.as_mut()
                {
                    membership.users = update.users.clone();
                }
            },
            ServerEvent::Message(_)
            | ServerEvent::NewFile(_)
            | ServerEvent::P2pSignal(_)
            | ServerEvent::RoomInvitation(_)
            | ServerEvent::InviteError(_) => {},
        }
    }
}
