//! Presence and Typing Registries
//!
//! In-memory maps fed by the push channel. Presence is keyed by the
//! typed (kind, id) composite; typing state is per room with
//! last-write-wins replacement. Neither is persisted: both are rebuilt
//! from the next snapshot after a reconnect.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::types::{PresenceKey, PresenceUpdate};

/// Who is currently online.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    online: RwLock<HashSet<PresenceKey>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map with a snapshot
    pub async fn apply_snapshot(&self, users: &[PresenceUpdate]) {
        let mut online = self.online.write().await;
        online.clear();
        online.extend(
            users
                .iter()
                .filter(|user| user.is_online)
                .map(PresenceUpdate::key),
        );
    }

    /// Apply an incremental add/remove
    pub async fn apply_update(&self, update: &PresenceUpdate) {
        let mut online = self.online.write().await;
        if update.is_online {
            online.insert(update.key());
        } else {
            online.remove(&update.key());
        }
    }

    /// Whether an entity is currently online
    pub async fn is_online(&self, key: PresenceKey) -> bool {
        self.online.read().await.contains(&key)
    }

    /// Number of online entities
    pub async fn online_count(&self) -> usize {
        self.online.read().await.len()
    }

    /// Current set of online entities
    pub async fn online_keys(&self) -> HashSet<PresenceKey> {
        self.online.read().await.clone()
    }
}

/// Who is typing, per room.
#[derive(Debug, Default)]
pub struct TypingRegistry {
    typing: RwLock<HashMap<i64, Vec<String>>>,
}

impl TypingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a room's typing set (last write wins)
    pub async fn set_room(&self, room_id: i64, users: Vec<String>) {
        let mut typing = self.typing.write().await;
        if users.is_empty() {
            typing.remove(&room_id);
        } else {
            typing.insert(room_id, users);
        }
    }

    /// Who is typing in a room right now
    pub async fn typing_in(&self, room_id: i64) -> Vec<String> {
        self.typing
            .read()
            .await
            .get(&room_id)
            .cloned()
            .unwrap_or_default()
    }
}
