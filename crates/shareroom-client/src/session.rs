//! Connection lifecycle state machine.
//!
//! [`Session`] owns the lifecycle of the one persistent connection to the
//! server. It is Sans-IO: transport facts come in as [`SessionEvent`]s and
//! the instructions for the transport come back as [`SessionAction`]s, so
//! the same machine runs under a real QUIC driver or a test feeding events
//! by hand.
//!
//! # State machine
//!
//! `Disconnected → Connecting → Connected`, with `Connected → Reconnecting`
//! on any close the caller did not ask for. `Reconnecting` re-attempts the
//! handshake without caller involvement and returns to `Connected` on
//! success. A caller [`Session::close`] moves to `Disconnected` from any
//! state and is terminal until [`Session::open`]. Connection errors while
//! `Connecting`/`Reconnecting` are surfaced as notices and retried; they
//! never transition to `Disconnected` on their own.

use shareroom_proto::{ClientRequest, ServerEvent};

use crate::notify::{Notice, notice_for};

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, and none wanted.
    Disconnected,
    /// First connection attempt in flight.
    Connecting,
    /// Live connection with a server-assigned identifier.
    Connected,
    /// Connection lost; handshake re-attempts in flight.
    Reconnecting,
}

/// Why the transport reported a closed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server closed the connection.
    ServerClosed,
    /// The transport failed (timeout, reset, path loss).
    TransportLost,
    /// The local side closed the connection.
    LocalClosed,
}

/// Transport facts fed into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Handshake completed; the server assigned this connection id.
    TransportOpened {
        /// Server-assigned connection identifier.
        connection_id: String,
    },

    /// The connection closed.
    TransportClosed {
        /// Close classification, driving the reconnect rule.
        reason: DisconnectReason,
    },

    /// A connection attempt failed before the handshake completed.
    ConnectFailed {
        /// Transport error description, for the log.
        error: String,
    },

    /// A decoded event arrived from the server.
    EventReceived(ServerEvent),
}

/// Instructions the session produces for its driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Establish a transport connection to the server.
    Connect {
        /// Server address (host:port).
        server_addr: String,
    },

    /// Tear down the transport connection.
    Disconnect,

    /// Transmit a request over the connection.
    Send(ClientRequest),

    /// Surface a user-facing notice.
    ///
    /// Emitted before the matching [`SessionAction::Dispatch`], preserving
    /// notify-before-fan-out ordering.
    Notify(Notice),

    /// Fan an event out through the dispatch registry.
    Dispatch(ServerEvent),
}

/// Connection manager: one session per running application instance.
///
/// Caller-owned; "at most one live connection" is enforced by this object,
/// not by module-level state.
#[derive(Debug)]
pub struct Session {
    state: ConnectionState,
    server_addr: String,
    connection_id: Option<String>,
    /// Events that arrived before the handshake reply, replayed on open.
    pending: Vec<ServerEvent>,
}

impl Session {
    /// Create a disconnected session targeting the given server address.
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            server_addr: server_addr.into(),
            connection_id: None,
            pending: Vec::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Server address (host:port) this session targets.
    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Server-assigned connection identifier, once connected.
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    /// Whether membership and stream state derived from this session are
    /// still valid (`Connected` or `Reconnecting`).
    pub fn is_live(&self) -> bool {
        matches!(self.state, ConnectionState::Connected | ConnectionState::Reconnecting)
    }

    /// Ensure a connection exists or is being established.
    ///
    /// Idempotent: only the `Disconnected` state starts an attempt, so
    /// concurrent callers share the in-flight attempt rather than starting a
    /// second one.
    pub fn open(&mut self) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Disconnected => {
                self.state = ConnectionState::Connecting;
                vec![SessionAction::Connect { server_addr: self.server_addr.clone() }]
            },
            ConnectionState::Connecting
            | ConnectionState::Connected
            | ConnectionState::Reconnecting => vec![],
        }
    }

    /// Terminate the connection.
    ///
    /// Always lands in `Disconnected`, from any state, and stays there until
    /// [`Session::open`]. A close while already disconnected does nothing.
    pub fn close(&mut self) -> Vec<SessionAction> {
        if self.state == ConnectionState::Disconnected {
            return vec![];
        }

        self.state = ConnectionState::Disconnected;
        self.connection_id = None;
        self.pending.clear();
        vec![SessionAction::Disconnect]
    }

    /// Queue a request for transmission.
    ///
    /// Requests are forwarded while `Connected`, and while `Connecting` (the
    /// transport holds them until the handshake completes, preserving
    /// join-immediately-after-open). While `Reconnecting` or `Disconnected`
    /// delivery is not guaranteed, so the request is dropped and logged
    /// rather than queued.
    pub fn send(&mut self, request: ClientRequest) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Connected | ConnectionState::Connecting => {
                vec![SessionAction::Send(request)]
            },
            ConnectionState::Reconnecting | ConnectionState::Disconnected => {
                tracing::warn!(
                    state = ?self.state,
                    request = request.name(),
                    "dropping outbound request without a live connection"
                );
                vec![]
            },
        }
    }

    /// Process a transport fact and return resulting actions.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::TransportOpened { connection_id } => {
                self.handle_opened(connection_id)
            },
            SessionEvent::TransportClosed { reason } => self.handle_closed(reason),
            SessionEvent::ConnectFailed { error } => self.handle_connect_failed(&error),
            SessionEvent::EventReceived(event) => self.handle_event(event),
        }
    }

    fn handle_opened(&mut self, connection_id: String) -> Vec<SessionAction> {
        if self.state == ConnectionState::Disconnected {
            // Raced with a local close; the disconnect action already issued
            // will tear the transport down.
            tracing::debug!("ignoring handshake completion after local close");
            return vec![];
        }

        tracing::info!(%connection_id, "connected to server");
        self.state = ConnectionState::Connected;
        self.connection_id = Some(connection_id);

        // Replay events that overtook the handshake reply, in arrival order.
        let mut actions = Vec::new();
        for event in std::mem::take(&mut self.pending) {
            Self::deliver(event, &mut actions);
        }
        actions
    }

    fn handle_closed(&mut self, reason: DisconnectReason) -> Vec<SessionAction> {
        match (self.state, reason) {
            (ConnectionState::Disconnected, _) | (_, DisconnectReason::LocalClosed) => {
                // Caller-initiated close; never reconnect.
                vec![]
            },
            (_, DisconnectReason::ServerClosed | DisconnectReason::TransportLost) => {
                tracing::info!(?reason, "connection closed, reconnecting");
                self.state = ConnectionState::Reconnecting;
                self.connection_id = None;
                self.pending.clear();
                vec![SessionAction::Connect { server_addr: self.server_addr.clone() }]
            },
        }
    }

    fn handle_connect_failed(&mut self, error: &str) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Reconnecting => {
                tracing::warn!(%error, state = ?self.state, "connection attempt failed");
                vec![
                    SessionAction::Notify(Notice::connection_failure()),
                    SessionAction::Connect { server_addr: self.server_addr.clone() },
                ]
            },
            ConnectionState::Connected | ConnectionState::Disconnected => {
                // Stale failure from an attempt we no longer care about.
                tracing::debug!(%error, state = ?self.state, "ignoring stale connect failure");
                vec![]
            },
        }
    }

    fn handle_event(&mut self, event: ServerEvent) -> Vec<SessionAction> {
        match self.state {
            ConnectionState::Connecting => {
                // Stream data can overtake the handshake reply; hold the
                // event until the connection id arrives.
                tracing::debug!(kind = %event.kind(), "buffering event until handshake completes");
                self.pending.push(event);
                vec![]
            },
            ConnectionState::Disconnected => {
                tracing::warn!(kind = %event.kind(), "ignoring event without session");
                vec![]
            },
            ConnectionState::Connected | ConnectionState::Reconnecting => {
                let mut actions = Vec::with_capacity(2);
                Self::deliver(event, &mut actions);
                actions
            },
        }
    }

    fn deliver(event: ServerEvent, actions: &mut Vec<SessionAction>) {
        if let Some(notice) = notice_for(&event) {
            actions.push(SessionAction::Notify(notice));
        }
        actions.push(SessionAction::Dispatch(event));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shareroom_proto::payloads::{room, stream};

    use super::*;

    fn connected_session() -> Session {
        let mut session = Session::new("localhost:4433");
        let _ = session.open();
        let _ = session.handle(SessionEvent::TransportOpened {
            connection_id: "c1".to_string(),
        });
        session
    }

    #[test]
    fn open_is_idempotent_with_one_attempt_in_flight() {
        let mut session = Session::new("localhost:4433");

        let actions = session.open();
        assert!(matches!(actions.as_slice(), [SessionAction::Connect { .. }]));
        assert_eq!(session.state(), ConnectionState::Connecting);

        // Second open while the attempt is in flight starts nothing new.
        assert!(session.open().is_empty());

        // And open on a live connection starts nothing either.
        let mut session = connected_session();
        assert!(session.open().is_empty());
    }

    #[test]
    fn handshake_assigns_the_connection_id() {
        let session = connected_session();
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.connection_id(), Some("c1"));
    }

    #[test]
    fn server_close_triggers_exactly_one_reconnect_attempt() {
        let mut session = connected_session();

        let actions =
            session.handle(SessionEvent::TransportClosed { reason: DisconnectReason::ServerClosed });

        let connects = actions
            .iter()
            .filter(|a| matches!(a, SessionAction::Connect { .. }))
            .count();
        assert_eq!(connects, 1);
        assert_eq!(session.state(), ConnectionState::Reconnecting);
        assert_eq!(session.connection_id(), None);

        // Successful handshake returns to Connected with the new id.
        let _ = session.handle(SessionEvent::TransportOpened {
            connection_id: "c2".to_string(),
        });
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.connection_id(), Some("c2"));
    }

    #[test]
    fn local_close_never_reconnects() {
        let mut session = connected_session();

        let actions = session.close();
        assert!(matches!(actions.as_slice(), [SessionAction::Disconnect]));
        assert_eq!(session.state(), ConnectionState::Disconnected);

        // The transport reports the closure back; nothing happens.
        let actions =
            session.handle(SessionEvent::TransportClosed { reason: DisconnectReason::LocalClosed });
        assert!(actions.is_empty());
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn connect_failure_notifies_and_retries_without_disconnecting() {
        let mut session = Session::new("localhost:4433");
        let _ = session.open();

        let actions = session.handle(SessionEvent::ConnectFailed {
            error: "connection refused".to_string(),
        });

        assert!(matches!(
            actions.as_slice(),
            [SessionAction::Notify(notice), SessionAction::Connect { .. }]
                if notice.text.contains("Failed to connect")
        ));
        assert_eq!(session.state(), ConnectionState::Connecting);
    }

    #[test]
    fn reconnecting_cycles_on_repeated_failure() {
        let mut session = connected_session();
        let _ = session
            .handle(SessionEvent::TransportClosed { reason: DisconnectReason::TransportLost });
        assert_eq!(session.state(), ConnectionState::Reconnecting);

        for _ in 0..3 {
            let actions =
                session.handle(SessionEvent::ConnectFailed { error: "timed out".to_string() });
            assert!(actions.iter().any(|a| matches!(a, SessionAction::Connect { .. })));
            assert_eq!(session.state(), ConnectionState::Reconnecting);
        }
    }

    #[test]
    fn sends_forward_while_connected_and_drop_while_reconnecting() {
        let mut session = connected_session();
        let request = ClientRequest::SendMessage(stream::OutboundMessage {
            room_id: "room-1".to_string(),
            message: "hello".to_string(),
        });

        let actions = session.send(request.clone());
        assert!(matches!(actions.as_slice(), [SessionAction::Send(_)]));

        let _ = session
            .handle(SessionEvent::TransportClosed { reason: DisconnectReason::ServerClosed });
        assert!(session.send(request).is_empty());
    }

    #[test]
    fn events_dispatch_with_notice_first() {
        let mut session = connected_session();
        let event = ServerEvent::RoomInfo(room::RoomInfo {
            room_id: "room-1".to_string(),
            is_private: false,
            users: vec![],
        });

        let actions = session.handle(SessionEvent::EventReceived(event.clone()));
        assert!(matches!(
            actions.as_slice(),
            [SessionAction::Notify(_), SessionAction::Dispatch(dispatched)]
                if *dispatched == event
        ));
    }

    #[test]
    fn silent_events_dispatch_without_notice() {
        let mut session = connected_session();
        let event = ServerEvent::Message(stream::ChatMessage {
            user: room::User { id: "c2".to_string(), username: "bob".to_string() },
            message: "hi".to_string(),
            time: 1,
        });

        let actions = session.handle(SessionEvent::EventReceived(event));
        assert!(matches!(actions.as_slice(), [SessionAction::Dispatch(_)]));
    }

    #[test]
    fn events_overtaking_the_handshake_replay_on_open() {
        let mut session = Session::new("localhost:4433");
        let _ = session.open();

        // The join reply can land before the handshake reply's stream.
        let event = ServerEvent::RoomInfo(room::RoomInfo {
            room_id: "room-1".to_string(),
            is_private: false,
            users: vec![],
        });
        assert!(session.handle(SessionEvent::EventReceived(event.clone())).is_empty());

        let actions = session.handle(SessionEvent::TransportOpened {
            connection_id: "c1".to_string(),
        });
        assert!(matches!(
            actions.as_slice(),
            [SessionAction::Notify(_), SessionAction::Dispatch(dispatched)]
                if *dispatched == event
        ));
    }

    #[test]
    fn close_discards_events_buffered_while_connecting() {
        let mut session = Session::new("localhost:4433");
        let _ = session.open();

        let event = ServerEvent::RoomJoinError(room::ErrorNotice {
            message: "Room not found".to_string(),
        });
        let _ = session.handle(SessionEvent::EventReceived(event));
        let _ = session.close();

        // Nothing replays on the next connection.
        let _ = session.open();
        let actions = session.handle(SessionEvent::TransportOpened {
            connection_id: "c2".to_string(),
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn events_are_ignored_after_close() {
        let mut session = connected_session();
        let _ = session.close();

        let event = ServerEvent::RoomJoinError(room::ErrorNotice {
            message: "late".to_string(),
        });
        assert!(session.handle(SessionEvent::EventReceived(event)).is_empty());
    }
}
