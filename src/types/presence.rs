//! Presence Types
//!
//! Online status for admins and end users. The wire payloads carry a
//! `{type, id, is_online}` triple; locally the pair is a typed
//! composite key rather than a concatenated string.

use serde::{Deserialize, Serialize};

/// The kind of actor a presence entry refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Admin,
    User,
}

/// Composite key identifying one online entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenceKey {
    pub kind: ActorKind,
    pub id: i64,
}

/// A presence change as carried by the push channel, both in the
/// initial snapshot and in incremental updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceUpdate {
    #[serde(rename = "type")]
    pub kind: ActorKind,
    pub id: i64,
    pub is_online: bool,
}

impl PresenceUpdate {
    /// The typed map key for this update
    pub fn key(&self) -> PresenceKey {
        PresenceKey {
            kind: self.kind,
            id: self.id,
        }
    }
}
