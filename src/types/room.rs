//! Room Data Structures
//!
//! Represents a chat conversation tracked by both the server and the
//! local cache.

use serde::{Deserialize, Serialize};

/// A chat room as listed in the chat sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    /// Server-assigned room ID
    pub id: i64,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Preview of the most recent message
    #[serde(default)]
    pub last_message: Option<String>,
    /// Timestamp of the most recent message (RFC3339)
    #[serde(default)]
    pub last_message_at: Option<String>,
    /// Unread message counter
    #[serde(default)]
    pub unread_count: i64,
}

/// A participant in a room, as listed in room details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomMember {
    pub id: i64,
    pub name: String,
}

/// Detailed room metadata fetched on demand and cached read-through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomDetails {
    pub room_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<RoomMember>,
    pub created_at: String,
}
