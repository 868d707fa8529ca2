//! Chat and file-share payload types.
//!
//! These payloads populate a room's display stream. The server is the single
//! source of ordering truth: the sender's own message appears in the stream
//! only once it round-trips back as a `message` / `newFile` event.

use serde::{Deserialize, Serialize};

use crate::payloads::room::User;

/// Chat message pushed to all members of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sending user.
    pub user: User,
    /// Message text.
    pub message: String,
    /// Server timestamp, milliseconds since the Unix epoch.
    pub time: u64,
}

/// File-share notice pushed to all members of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileShareNotice {
    /// Sharing user.
    pub user: User,
    /// Metadata of the shared file.
    pub file_info: FileMeta,
    /// Server timestamp, milliseconds since the Unix epoch.
    pub time: u64,
}

/// Metadata describing an uploaded file.
///
/// Same shape the upload endpoint returns, so an upload result can be shared
/// into a room verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Download URL.
    pub url: String,
    /// MIME type reported at upload.
    pub mimetype: String,
}

/// Outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Target room.
    pub room_id: String,
    /// Message text.
    pub message: String,
}

/// Outbound file-share notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFileInfo {
    /// Target room.
    pub room_id: String,
    /// Metadata of the file to share.
    pub file_info: FileMeta,
}
