//! Chat Message Data Structures
//!
//! Defines the server-confirmed message shape, the locally cached row
//! with its send-lifecycle status, and the outgoing draft accepted by
//! the send path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a locally cached message.
///
/// Optimistically sent messages start as `Pending`, become `Delivered`
/// once the server confirms them, or `Failed` when the send errors and
/// the entry is left for the retry pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Awaiting server confirmation
    Pending,
    /// Confirmed by the server
    Delivered,
    /// Send failed, eligible for retry
    Failed,
}

impl MessageStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }

    /// Parse from string (database)
    pub fn parse(s: &str) -> Self {
        match s {
            "delivered" => MessageStatus::Delivered,
            "failed" => MessageStatus::Failed,
            _ => MessageStatus::Pending,
        }
    }
}

/// File or image attached to a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub url: String,
}

/// A server-confirmed chat message as returned by the REST API and the
/// push channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Server-assigned message ID
    pub id: i64,
    /// Room this message belongs to
    pub room_id: i64,
    /// Admin or user who sent the message
    pub sender_id: i64,
    /// Message content
    pub content: String,
    /// Optional attachment
    #[serde(default)]
    pub attachment: Option<Attachment>,
    /// Server ID of the message this replies to, if any
    #[serde(default)]
    pub reply_to: Option<i64>,
    /// When the message was created (RFC3339)
    pub created_at: String,
    /// When the message was last edited (RFC3339), if ever
    #[serde(default)]
    pub edited_at: Option<String>,
}

/// A message row as stored in the local cache.
///
/// Rows carry a cache-local `local_id` distinct from the server id.
/// Exactly one of `server_id` and `temp_id` is set: optimistic entries
/// have a temp id until the server confirms them, at which point the
/// temp row is deleted and replaced by a delivered row carrying the
/// server id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    /// Cache-local auto-increment identity
    pub local_id: i64,
    /// Server-assigned id, once confirmed
    pub server_id: Option<i64>,
    /// Client-generated correlation id for optimistic sends
    pub temp_id: Option<Uuid>,
    pub room_id: i64,
    /// Absent on optimistic entries (the server fills it in)
    pub sender_id: Option<i64>,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub reply_to: Option<i64>,
    pub status: MessageStatus,
    /// Number of send attempts so far
    pub retry_count: u32,
    /// When the last send attempt was made (RFC3339)
    pub last_attempt_at: Option<String>,
    /// Error message from the last failed attempt
    pub last_error: Option<String>,
    pub created_at: String,
    pub edited_at: Option<String>,
}

impl CachedMessage {
    /// Whether this entry is still owned by the send/retry flow.
    pub fn is_unsent(&self) -> bool {
        matches!(self.status, MessageStatus::Pending | MessageStatus::Failed)
    }
}

/// A user-composed message accepted by the send path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub room_id: i64,
    pub content: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub reply_to: Option<i64>,
}

impl OutgoingMessage {
    /// Create a plain text draft for a room
    pub fn text(room_id: i64, content: impl Into<String>) -> Self {
        Self {
            room_id,
            content: content.into(),
            attachment: None,
            reply_to: None,
        }
    }

    /// Attach a reply reference
    pub fn in_reply_to(mut self, message_id: i64) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    /// Attach a file
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
