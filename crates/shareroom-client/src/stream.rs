//! Combined chat and file-share stream.
//!
//! Append-only, arrival-ordered log of the records a room displays. Chat
//! messages and file notices interleave in one sequence: display order is
//! arrival order, and the server is the single source of ordering truth.
//! Nothing here deduplicates, retries, or reconciles; a dropped event is
//! permanently missing from the local view.

use shareroom_proto::{
    ServerEvent,
    payloads::{
        room::User,
        stream::{ChatMessage, FileShareNotice},
    },
};

/// One immutable entry in a room's display log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRecord {
    /// A chat message.
    Chat(ChatMessage),
    /// A file-share notice.
    File(FileShareNotice),
}

impl StreamRecord {
    /// User that produced this record.
    pub fn user(&self) -> &User {
        match self {
            StreamRecord::Chat(message) => &message.user,
            StreamRecord::File(notice) => &notice.user,
        }
    }

    /// Server timestamp of this record, milliseconds since the Unix epoch.
    pub fn time(&self) -> u64 {
        match self {
            StreamRecord::Chat(message) => message.time,
            StreamRecord::File(notice) => notice.time,
        }
    }
}

/// Append-only stream of a room's chat and file-share records.
#[derive(Debug, Default)]
pub struct RoomStream {
    records: Vec<StreamRecord>,
}

impl RoomStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in arrival order.
    pub fn records(&self) -> &[StreamRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the stream holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard all records; called by the owning UI on teardown.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Append the record an event carries, if any.
    ///
    /// Only `message` and `newFile` feed the stream; every other kind is
    /// ignored here.
    pub fn handle_event(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::Message(message) => {
                self.records.push(StreamRecord::Chat(message.clone()));
            },
            ServerEvent::NewFile(notice) => {
                self.records.push(StreamRecord::File(notice.clone()));
            },
            ServerEvent::RoomInfo(_)
            | ServerEvent::UserJoined(_)
            | ServerEvent::UserLeft(_)
            | ServerEvent::P2pSignal(_)
            | ServerEvent::RoomJoinError(_)
            | ServerEvent::RoomInvitation(_)
            | ServerEvent::InviteError(_) => {},
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shareroom_proto::payloads::{room, stream::FileMeta};

    use super::*;

    fn chat(text: &str, time: u64) -> ServerEvent {
        ServerEvent::Message(ChatMessage {
            user: room::User { id: "c2".to_string(), username: "bob".to_string() },
            message: text.to_string(),
            time,
        })
    }

    fn file(name: &str, time: u64) -> ServerEvent {
        ServerEvent::NewFile(FileShareNotice {
            user: room::User { id: "c2".to_string(), username: "bob".to_string() },
            file_info: FileMeta {
                name: name.to_string(),
                size: 64,
                url: format!("https://example.test/{name}"),
                mimetype: "application/octet-stream".to_string(),
            },
            time,
        })
    }

    #[test]
    fn messages_append_in_arrival_order() {
        let mut stream = RoomStream::new();
        stream.handle_event(&chat("one", 1));
        stream.handle_event(&chat("two", 2));
        stream.handle_event(&chat("three", 3));

        let texts: Vec<_> = stream
            .records()
            .iter()
            .map(|r| match r {
                StreamRecord::Chat(m) => m.message.as_str(),
                StreamRecord::File(_) => "",
            })
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn files_interleave_with_messages_by_arrival() {
        let mut stream = RoomStream::new();
        stream.handle_event(&chat("one", 1));
        stream.handle_event(&file("notes.txt", 2));
        stream.handle_event(&chat("two", 3));
        stream.handle_event(&chat("three", 4));

        assert_eq!(stream.len(), 4);
        assert!(matches!(&stream.records()[0], StreamRecord::Chat(_)));
        assert!(matches!(&stream.records()[1], StreamRecord::File(n) if n.file_info.name == "notes.txt"));
        assert!(matches!(&stream.records()[2], StreamRecord::Chat(_)));
        assert!(matches!(&stream.records()[3], StreamRecord::Chat(_)));
    }

    #[test]
    fn non_stream_events_do_not_append() {
        let mut stream = RoomStream::new();
        stream.handle_event(&ServerEvent::RoomInfo(room::RoomInfo {
            room_id: "room-1".to_string(),
            is_private: false,
            users: vec![],
        }));
        stream.handle_event(&ServerEvent::RoomJoinError(room::ErrorNotice {
            message: "nope".to_string(),
        }));

        assert!(stream.is_empty());
    }

    #[test]
    fn clear_discards_all_records() {
        let mut stream = RoomStream::new();
        stream.handle_event(&chat("one", 1));
        stream.clear();
        assert!(stream.is_empty());
    }
}
