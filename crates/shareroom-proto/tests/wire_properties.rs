//! Property-based tests for envelope encoding/decoding.
//!
//! Verifies the round-trip holds for arbitrary payload field values, not just
//! hand-picked examples: any server event the codec can produce must decode
//! back to an identical value with its kind intact.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use shareroom_proto::{
    ServerEvent,
    envelope::{Inbound, decode_inbound, encode_event},
    payloads::{room, stream},
};

/// Strategy for usernames and room ids: short printable strings including
/// the empty string, which the codec must not special-case.
fn arbitrary_text() -> impl Strategy<Value = String> + Clone {
    "[a-zA-Z0-9 _-]{0,24}"
}

fn arbitrary_user() -> impl Strategy<Value = room::User> + Clone {
    (arbitrary_text(), arbitrary_text())
        .prop_map(|(id, username)| room::User { id, username })
}

fn arbitrary_event() -> impl Strategy<Value = ServerEvent> {
    let users = prop::collection::vec(arbitrary_user(), 0..8);

    prop_oneof![
        (arbitrary_text(), any::<bool>(), users.clone()).prop_map(
            |(room_id, is_private, users)| ServerEvent::RoomInfo(room::RoomInfo {
                room_id,
                is_private,
                users,
            })
        ),
        (users.clone(), prop::option::of(arbitrary_text())).prop_map(|(users, username)| {
            ServerEvent::UserJoined(room::RosterUpdate { users, username })
        }),
        (users, prop::option::of(arbitrary_text())).prop_map(|(users, username)| {
            ServerEvent::UserLeft(room::RosterUpdate { users, username })
        }),
        (arbitrary_user(), arbitrary_text(), any::<u64>()).prop_map(|(user, message, time)| {
            ServerEvent::Message(stream::ChatMessage { user, message, time })
        }),
        (arbitrary_user(), arbitrary_text(), arbitrary_text(), any::<u64>(), any::<u64>())
            .prop_map(|(user, name, url, size, time)| {
                ServerEvent::NewFile(stream::FileShareNotice {
                    user,
                    file_info: stream::FileMeta {
                        name,
                        size,
                        url,
                        mimetype: "application/octet-stream".to_string(),
                    },
                    time,
                })
            }),
        arbitrary_text().prop_map(|message| {
            ServerEvent::RoomJoinError(room::ErrorNotice { message })
        }),
        arbitrary_text().prop_map(|message| {
            ServerEvent::InviteError(room::ErrorNotice { message })
        }),
        (arbitrary_text(), arbitrary_text()).prop_map(|(username, room_id)| {
            ServerEvent::RoomInvitation(room::RoomInvitation {
                from: room::Inviter { username },
                room_id,
            })
        }),
    ]
}

proptest! {
    /// Round-trip: encode then decode yields the identical event.
    #[test]
    fn event_round_trip(event in arbitrary_event()) {
        let bytes = encode_event(&event).unwrap();
        let decoded = decode_inbound(&bytes).unwrap();
        prop_assert_eq!(decoded, Inbound::Event(event));
    }

    /// The envelope's routing name always matches the decoded kind.
    #[test]
    fn decoded_kind_matches_encoded_kind(event in arbitrary_event()) {
        let kind = event.kind();
        let bytes = encode_event(&event).unwrap();
        match decode_inbound(&bytes).unwrap() {
            Inbound::Event(decoded) => prop_assert_eq!(decoded.kind(), kind),
            Inbound::HelloReply(_) => prop_assert!(false, "event decoded as handshake"),
        }
    }
}
