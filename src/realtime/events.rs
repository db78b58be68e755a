//! Push Channel Wire Events
//!
//! JSON frames exchanged over the persistent connection. Inbound
//! frames are externally tagged `{"event": ..., "data": ...}` with
//! kebab-case event names; the outbound direction carries only
//! mark-as-read receipts.

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, PresenceUpdate};

/// An inbound push notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum PushEvent {
    /// A message was created in some room
    NewMessage(ChatMessage),
    /// A message's content was edited
    MessageEdited {
        id: i64,
        room_id: i64,
        content: String,
        edited_at: String,
    },
    /// A message was deleted
    MessageDeleted { id: i64, room_id: i64 },
    /// Full snapshot of who is online, sent once after subscribing
    InitialOnlineUsers { users: Vec<PresenceUpdate> },
    /// Incremental presence change for a single entity
    UserStatusUpdate(PresenceUpdate),
    /// Who is currently typing in a room; replaces the previous set
    TypingUpdate { room_id: i64, users: Vec<String> },
    /// New unread counter for a room
    UnreadCountUpdate { room_id: i64, unread: i64 },
}

/// An outbound client frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Acknowledge messages as read in a room
    MarkAsRead {
        room_id: i64,
        status_ids: Vec<i64>,
    },
}
