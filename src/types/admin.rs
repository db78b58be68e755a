//! Admin Directory and Starred Message Types

use serde::{Deserialize, Serialize};

/// An admin account from the directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A message the current admin has starred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StarredMessage {
    pub message_id: i64,
    pub room_id: i64,
    pub content: String,
    pub starred_at: String,
}
