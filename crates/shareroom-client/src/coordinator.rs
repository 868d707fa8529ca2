//! Room session coordinator.
//!
//! [`RoomCoordinator`] is the top-level object the UI holds: it owns the
//! [`Session`] connection manager, the [`DispatchRegistry`], and the shared
//! room/stream state, and it installs the subscriptions that keep membership
//! and the display stream current.
//!
//! # Control flow
//!
//! A join intent opens the connection and sends `joinRoom`; server answers
//! arrive as transport events fed into [`RoomCoordinator::handle_transport`],
//! which runs the session state machine, applies the notification policy,
//! and fans each event out through the registry. The membership and stream
//! subscriptions installed here mutate the shared state the UI renders from.
//!
//! All of this is synchronous and single-threaded: dispatch happens on the
//! caller's stack, one event at a time, in arrival order. Outbound
//! operations are fire-and-forget; their effects are observed only through
//! later dispatched events.

use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use shareroom_proto::{
    ClientRequest, EventKind, ServerEvent,
    payloads::{
        room::{InviteRequest, JoinRequest, OutboundSignal},
        stream::{FileMeta, OutboundFileInfo, OutboundMessage},
    },
};

use crate::{
    notify::Notice,
    registry::{DispatchRegistry, SubscriberId},
    room::RoomSession,
    session::{ConnectionState, Session, SessionAction, SessionEvent},
    stream::RoomStream,
};

/// Receiver for user-facing notices (the toast rail).
type NoticeSink = Box<dyn FnMut(Notice)>;

/// Coordinator owning one session, its registry, and the room state.
pub struct RoomCoordinator {
    session: Session,
    registry: Rc<DispatchRegistry>,
    room: Rc<RefCell<RoomSession>>,
    stream: Rc<RefCell<RoomStream>>,
    /// Mirror of the session's connection id for the membership closures.
    connection_id: Rc<RefCell<Option<String>>>,
    notice_sink: Option<NoticeSink>,
    /// Whether the internal membership/stream subscriptions are installed.
    wired: bool,
}

impl RoomCoordinator {
    /// Create a coordinator targeting the given server address.
    pub fn new(server_addr: impl Into<String>) -> Self {
        let mut coordinator = Self {
            session: Session::new(server_addr),
            registry: Rc::new(DispatchRegistry::new()),
            room: Rc::new(RefCell::new(RoomSession::new())),
            stream: Rc::new(RefCell::new(RoomStream::new())),
            connection_id: Rc::new(RefCell::new(None)),
            notice_sink: None,
            wired: false,
        };
        coordinator.install_wiring();
        coordinator
    }

    /// Install the sink that receives user-facing notices.
    ///
    /// The notice an event raises is delivered here before that event fans
    /// out to subscribers, so the user sees the toast before any callback
    /// side effect. Without a sink, notices are logged and dropped.
    pub fn set_notice_sink(&mut self, sink: impl FnMut(Notice) + 'static) {
        self.notice_sink = Some(Box::new(sink));
    }

    /// Install the subscriptions that drive membership and the stream.
    fn install_wiring(&mut self) {
        let membership_kinds = [
            EventKind::RoomInfo,
            EventKind::UserJoined,
            EventKind::UserLeft,
            EventKind::RoomJoinError,
        ];
        for kind in membership_kinds {
            let room = Rc::clone(&self.room);
            let connection_id = Rc::clone(&self.connection_id);
            self.registry.subscribe(kind, move |event| {
                let id = connection_id.borrow().clone();
                room.borrow_mut().handle_event(id.as_deref(), event);
            });
        }

        for kind in [EventKind::Message, EventKind::NewFile] {
            let stream = Rc::clone(&self.stream);
            self.registry.subscribe(kind, move |event| {
                stream.borrow_mut().handle_event(event);
            });
        }

        self.wired = true;
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    /// Server-assigned connection identifier, once connected.
    pub fn connection_id(&self) -> Option<String> {
        self.session.connection_id().map(String::from)
    }

    /// Room membership state, for rendering.
    pub fn room(&self) -> Ref<'_, RoomSession> {
        self.room.borrow()
    }

    /// Chat/file stream, for rendering.
    pub fn stream(&self) -> Ref<'_, RoomStream> {
        self.stream.borrow()
    }

    /// Register a callback for an event kind.
    ///
    /// Kinds are the closed enumeration; there is no way to register for an
    /// event outside it. Invocation order is subscription order.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl FnMut(&ServerEvent) + 'static,
    ) -> SubscriberId {
        self.registry.subscribe(kind, callback)
    }

    /// Remove a previously-registered callback; absent ids are a no-op.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriberId) {
        self.registry.unsubscribe(kind, id);
    }

    /// Number of subscribers for a kind, internal wiring included.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry.subscriber_count(kind)
    }

    /// Ensure a connection exists or is being established.
    ///
    /// After a [`RoomCoordinator::close`], this also re-installs the
    /// internal membership/stream wiring the close tore down; caller
    /// subscriptions do not come back.
    pub fn open(&mut self) -> Vec<SessionAction> {
        if !self.wired {
            self.install_wiring();
        }
        self.session.open()
    }

    /// Terminate the connection and clear the registry back to empty.
    pub fn close(&mut self) -> Vec<SessionAction> {
        let actions = self.session.close();
        self.registry.clear();
        self.wired = false;
        *self.connection_id.borrow_mut() = None;
        actions
    }

    /// Join a room.
    ///
    /// Ensures the connection is open, marks the room session as joining,
    /// and sends the request. Does not block; the outcome arrives as a
    /// `roomInfo` or `roomJoinError` event.
    pub fn join(&mut self, request: JoinRequest) -> Vec<SessionAction> {
        let mut actions = self.open();
        self.room.borrow_mut().begin_join(&request.username);
        actions.extend(self.session.send(ClientRequest::JoinRoom(request)));
        actions
    }

    /// Send a chat message to a room.
    ///
    /// The message is not appended locally; it appears in the stream when
    /// the server echoes it back as a `message` event.
    pub fn send_message(
        &mut self,
        room_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Vec<SessionAction> {
        self.session.send(ClientRequest::SendMessage(OutboundMessage {
            room_id: room_id.into(),
            message: message.into(),
        }))
    }

    /// Share uploaded-file metadata with a room.
    ///
    /// Like [`RoomCoordinator::send_message`], the notice only enters the
    /// local stream once the server round-trips it as `newFile`.
    pub fn share_file(
        &mut self,
        room_id: impl Into<String>,
        file_info: FileMeta,
    ) -> Vec<SessionAction> {
        self.session.send(ClientRequest::FileInfo(OutboundFileInfo {
            room_id: room_id.into(),
            file_info,
        }))
    }

    /// Relay a peer-to-peer signal to another client.
    ///
    /// The `from` field is always the local connection id; without one there
    /// is no identity to sign the signal with, so it is dropped and logged.
    pub fn send_signal(
        &mut self,
        to: impl Into<String>,
        signal: ciborium::Value,
    ) -> Vec<SessionAction> {
        let Some(from) = self.session.connection_id().map(String::from) else {
            tracing::warn!("dropping p2p signal: no connection id yet");
            return vec![];
        };

        self.session.send(ClientRequest::P2pSignal(OutboundSignal {
            to: to.into(),
            signal,
            from,
        }))
    }

    /// Invite another connected client to a room.
    pub fn invite(
        &mut self,
        room_id: impl Into<String>,
        target_socket_id: impl Into<String>,
    ) -> Vec<SessionAction> {
        self.session.send(ClientRequest::InviteToRoom(InviteRequest {
            room_id: room_id.into(),
            target_socket_id: target_socket_id.into(),
        }))
    }

    /// Process a transport event.
    ///
    /// Runs the session state machine, mirrors the connection id for the
    /// membership closures, and executes the resulting actions in emitted
    /// order: a notice reaches the sink before its event fans out to
    /// subscribers. Dispatch happens here, synchronously; the remaining
    /// transport actions (connects, sends, disconnects) are returned for the
    /// driver to execute.
    pub fn handle_transport(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        let actions = self.session.handle(event);
        *self.connection_id.borrow_mut() = self.session.connection_id().map(String::from);

        let mut remaining = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                SessionAction::Notify(notice) => self.surface_notice(notice),
                SessionAction::Dispatch(event) => self.registry.dispatch(&event),
                other => remaining.push(other),
            }
        }
        remaining
    }

    fn surface_notice(&mut self, notice: Notice) {
        match self.notice_sink.as_mut() {
            Some(sink) => sink(notice),
            None => {
                tracing::info!(level = ?notice.level, text = %notice.text, "notice without sink");
            },
        }
    }
}
