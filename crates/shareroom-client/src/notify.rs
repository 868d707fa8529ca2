//! Notification policy.
//!
//! Stateless mapping from an inbound event to the user-facing notice it
//! should raise, evaluated once per dispatch before fan-out. Rendering the
//! notice (toast, status line) is the caller's concern; only the policy of
//! *which* events notify lives here, so it is testable without any UI or
//! dispatch wiring.

use shareroom_proto::ServerEvent;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// Positive confirmation.
    Success,
    /// Failure the user should see.
    Error,
}

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, for presentation.
    pub level: NoticeLevel,
    /// Display text.
    pub text: String,
}

impl Notice {
    fn info(text: String) -> Self {
        Self { level: NoticeLevel::Info, text }
    }

    fn success(text: String) -> Self {
        Self { level: NoticeLevel::Success, text }
    }

    fn error(text: String) -> Self {
        Self { level: NoticeLevel::Error, text }
    }

    /// Notice raised when a connection attempt fails.
    ///
    /// Transport errors never carry server copy, so the text is fixed; the
    /// underlying error goes to the log, not the user.
    pub fn connection_failure() -> Self {
        Self::error("Failed to connect to server. Please try again later.".to_string())
    }
}

/// The notice an event should raise, if any.
///
/// `message`, `newFile`, and `p2pSignal` are silent: they render in the
/// stream or feed the signaling layer, not the toast rail.
pub fn notice_for(event: &ServerEvent) -> Option<Notice> {
    match event {
        ServerEvent::RoomJoinError(e) | ServerEvent::InviteError(e) => {
            Some(Notice::error(e.message.clone()))
        },
        ServerEvent::RoomInfo(info) => {
            Some(Notice::success(format!("Joined room: {}", info.room_id)))
        },
        ServerEvent::UserJoined(update) => update
            .username
            .as_ref()
            .map(|name| Notice::info(format!("{name} joined the room"))),
        ServerEvent::UserLeft(update) => update
            .username
            .as_ref()
            .map(|name| Notice::info(format!("{name} left the room"))),
        ServerEvent::RoomInvitation(invite) => Some(Notice::info(format!(
            "You've been invited to a room by {}",
            invite.from.username
        ))),
        ServerEvent::Message(_) | ServerEvent::NewFile(_) | ServerEvent::P2pSignal(_) => None,
    }
}
