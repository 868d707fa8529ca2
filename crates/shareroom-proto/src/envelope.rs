//! Wire envelope encoding and decoding.
//!
//! Every realtime message travels as one CBOR map `{event, data}`: the event
//! name routes the payload, the data field is the payload itself. One
//! envelope per transport stream, so no length framing is needed here.
//!
//! Unknown inbound event names decode to [`ProtocolError::UnknownEvent`].
//! That is a local, non-fatal condition: the caller logs the name and drops
//! the envelope without disturbing dispatch of known kinds.

use ciborium::Value;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    errors::{ProtocolError, Result},
    event::EventKind,
    payloads::{ClientRequest, ServerEvent, session},
};

/// Maximum encoded envelope size (1 MiB).
///
/// Chat and control payloads are small; file content never crosses this
/// protocol (only metadata does), so anything larger is malformed or hostile.
pub const MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

/// Wire name of the handshake reply, the only inbound message outside the
/// fixed event enumeration.
const HELLO_REPLY: &str = "helloReply";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Handshake reply carrying the server-assigned connection id.
    HelloReply(session::HelloReply),
    /// Regular event from the fixed enumeration.
    Event(ServerEvent),
}

/// On-wire shape of every message.
#[derive(Serialize, Deserialize)]
struct Envelope {
    /// Event name routing the payload.
    event: String,
    /// CBOR payload, shape determined by `event`.
    data: Value,
}

/// Encode an outbound request into envelope bytes.
pub fn encode_request(request: &ClientRequest) -> Result<Vec<u8>> {
    let data = match request {
        ClientRequest::JoinRoom(p) => to_value(p)?,
        ClientRequest::SendMessage(p) => to_value(p)?,
        ClientRequest::FileInfo(p) => to_value(p)?,
        ClientRequest::P2pSignal(p) => to_value(p)?,
        ClientRequest::InviteToRoom(p) => to_value(p)?,
        ClientRequest::Hello(p) => to_value(p)?,
    };

    let envelope = Envelope { event: request.name().to_string(), data };

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&envelope, &mut bytes)
        .map_err(|e| ProtocolError::Encode(e.to_string()))?;

    if bytes.len() > MAX_ENVELOPE_SIZE {
        return Err(ProtocolError::EnvelopeTooLarge {
            size: bytes.len(),
            max: MAX_ENVELOPE_SIZE,
        });
    }

    Ok(bytes)
}

/// Decode inbound envelope bytes.
///
/// # Errors
///
/// - [`ProtocolError::UnknownEvent`] for names outside the fixed set
/// - [`ProtocolError::InvalidPayload`] when the payload does not match the
///   named event's shape
/// - [`ProtocolError::Decode`] when the envelope itself is not valid CBOR
pub fn decode_inbound(bytes: &[u8]) -> Result<Inbound> {
    if bytes.len() > MAX_ENVELOPE_SIZE {
        return Err(ProtocolError::EnvelopeTooLarge {
            size: bytes.len(),
            max: MAX_ENVELOPE_SIZE,
        });
    }

    let envelope: Envelope =
        ciborium::de::from_reader(bytes).map_err(|e| ProtocolError::Decode(e.to_string()))?;

    if envelope.event == HELLO_REPLY {
        let reply = from_value(&envelope.event, &envelope.data)?;
        return Ok(Inbound::HelloReply(reply));
    }

    let kind: EventKind = envelope.event.parse()?;
    let event = match kind {
        EventKind::RoomInfo => ServerEvent::RoomInfo(from_value(&envelope.event, &envelope.data)?),
        EventKind::UserJoined => {
            ServerEvent::UserJoined(from_value(&envelope.event, &envelope.data)?)
        },
        EventKind::Message => ServerEvent::Message(from_value(&envelope.event, &envelope.data)?),
        EventKind::NewFile => ServerEvent::NewFile(from_value(&envelope.event, &envelope.data)?),
        EventKind::UserLeft => ServerEvent::UserLeft(from_value(&envelope.event, &envelope.data)?),
        EventKind::P2pSignal => {
            ServerEvent::P2pSignal(from_value(&envelope.event, &envelope.data)?)
        },
        EventKind::RoomJoinError => {
            ServerEvent::RoomJoinError(from_value(&envelope.event, &envelope.data)?)
        },
        EventKind::RoomInvitation => {
            ServerEvent::RoomInvitation(from_value(&envelope.event, &envelope.data)?)
        },
        EventKind::InviteError => {
            ServerEvent::InviteError(from_value(&envelope.event, &envelope.data)?)
        },
    };

    Ok(Inbound::Event(event))
}

/// Encode a server event into envelope bytes.
///
/// The production client only decodes events, but tests and in-process
/// harnesses need to produce them, mirroring a real server.
pub fn encode_event(event: &ServerEvent) -> Result<Vec<u8>> {
    let data = match event {
        ServerEvent::RoomInfo(p) => to_value(p)?,
        ServerEvent::UserJoined(p) | ServerEvent::UserLeft(p) => to_value(p)?,
        ServerEvent::Message(p) => to_value(p)?,
        ServerEvent::NewFile(p) => to_value(p)?,
        ServerEvent::P2pSignal(p) => to_value(p)?,
        ServerEvent::RoomJoinError(p) | ServerEvent::InviteError(p) => to_value(p)?,
        ServerEvent::RoomInvitation(p) => to_value(p)?,
    };

    let envelope = Envelope { event: event.kind().as_str().to_string(), data };

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&envelope, &mut bytes)
        .map_err(|e| ProtocolError::Encode(e.to_string()))?;

    Ok(bytes)
}

fn to_value<T: Serialize>(payload: &T) -> Result<Value> {
    Value::serialized(payload).map_err(|e| ProtocolError::Encode(e.to_string()))
}

fn from_value<T: DeserializeOwned>(event: &str, data: &Value) -> Result<T> {
    data.deserialized().map_err(|e| ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}
