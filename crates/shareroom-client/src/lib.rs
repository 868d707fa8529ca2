//! Client
//!
//! Realtime room session coordinator for the shareroom client. Manages the
//! persistent server connection, event fan-out to subscribers, room
//! membership state, and the chat/file display stream.
//!
//! # Architecture
//!
//! The core is Sans-IO and action-based: transport facts go in as
//! [`SessionEvent`]s, pure state machine logic runs, and [`SessionAction`]s
//! come back for the caller to execute. Event fan-out is synchronous and
//! single-threaded; callbacks run on the caller's stack in subscription
//! order.
//!
//! # Components
//!
//! - [`RoomCoordinator`]: Top-level object wiring everything together
//! - [`Session`]: Connection lifecycle state machine
//! - [`DispatchRegistry`]: Per-event-kind subscriber lists
//! - [`RoomSession`]: Join lifecycle and roster state
//! - [`RoomStream`]: Chronological chat/file record aggregation
//! - [`notice_for`]: Notification policy mapping events to user notices
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedTransport`]: Channels bridging a QUIC connection
//! - [`transport::connect`]: Connect to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod coordinator;
mod notify;
mod registry;
mod room;
mod session;
mod stream;

#[cfg(feature = "transport")]
pub mod transport;

pub use coordinator::RoomCoordinator;
pub use notify::{Notice, NoticeLevel, notice_for};
pub use registry::{DispatchRegistry, SubscriberId};
pub use room::{CurrentUser, RoomMembership, RoomPhase, RoomSession};
pub use session::{
    ConnectionState, DisconnectReason, Session, SessionAction, SessionEvent,
};
pub use shareroom_proto::{ClientRequest, EventKind, ServerEvent};
pub use stream::{RoomStream, StreamRecord};
