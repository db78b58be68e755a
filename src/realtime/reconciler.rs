//! Realtime Reconciler
//!
//! Folds inbound push events into the local cache and broadcasts the
//! matching refresh events. Events are handled in arrival order; the
//! only deduplication is the server-id presence check on new messages,
//! which also covers the race between an optimistic send completing
//! and the realtime echo of the same message.
//!
//! Cache failures are logged and swallowed: a missed cache write only
//! means the next fetch repairs the mirror.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::events::{EventBus, UiEvent};
use crate::realtime::events::PushEvent;
use crate::realtime::presence::{PresenceRegistry, TypingRegistry};
use crate::types::{ChatMessage, PresenceUpdate};

/// Push-event handler set.
pub struct Reconciler {
    cache: Arc<CacheStore>,
    bus: EventBus,
    presence: Arc<PresenceRegistry>,
    typing: Arc<TypingRegistry>,
    /// Room currently open in the UI; scopes thread-refresh signals
    active_room: RwLock<Option<i64>>,
}

impl Reconciler {
    pub fn new(
        cache: Arc<CacheStore>,
        bus: EventBus,
        presence: Arc<PresenceRegistry>,
        typing: Arc<TypingRegistry>,
    ) -> Self {
        Self {
            cache,
            bus,
            presence,
            typing,
            active_room: RwLock::new(None),
        }
    }

    /// Record which room the UI is currently showing
    pub async fn set_active_room(&self, room_id: Option<i64>) {
        *self.active_room.write().await = room_id;
    }

    pub async fn active_room(&self) -> Option<i64> {
        *self.active_room.read().await
    }

    /// Handle one inbound push event
    pub async fn handle(&self, event: PushEvent) {
        debug!(?event, "push event");
        match event {
            PushEvent::NewMessage(message) => self.on_new_message(message).await,
            PushEvent::MessageEdited {
                id,
                room_id,
                content,
                edited_at,
            } => self.on_message_edited(id, room_id, &content, &edited_at).await,
            PushEvent::MessageDeleted { id, room_id } => {
                self.on_message_deleted(id, room_id).await
            }
            PushEvent::InitialOnlineUsers { users } => {
                self.presence.apply_snapshot(&users).await;
                self.bus.emit(UiEvent::PresenceChanged);
            }
            PushEvent::UserStatusUpdate(update) => self.on_status_update(update).await,
            PushEvent::TypingUpdate { room_id, users } => {
                self.typing.set_room(room_id, users).await;
                self.bus.emit(UiEvent::TypingChanged { room_id });
            }
            PushEvent::UnreadCountUpdate { room_id, unread } => {
                // Passthrough only; the cache keeps no unread state
                // beyond the fetched room list.
                self.bus.emit(UiEvent::UnreadCountUpdated { room_id, unread });
            }
        }
    }

    async fn on_new_message(&self, message: ChatMessage) {
        match self.cache.contains_server_id(message.id).await {
            Ok(true) => {
                // Already mirrored (usually our own optimistic send);
                // nothing to write, nothing to signal.
                debug!(message_id = message.id, "duplicate new-message event");
                return;
            }
            Ok(false) => {}
            Err(error) => {
                warn!(%error, message_id = message.id, "duplicate check failed");
            }
        }

        if let Err(error) = self.cache.insert_delivered(&message).await {
            warn!(%error, message_id = message.id, "could not cache pushed message");
        }
        if let Err(error) = self
            .cache
            .touch_room_preview(message.room_id, &message.content, &message.created_at)
            .await
        {
            warn!(%error, room_id = message.room_id, "could not update room preview");
        }

        self.bus.emit(UiEvent::MessagesUpdated {
            room_id: message.room_id,
        });
        self.bus.emit(UiEvent::ChatListRefresh);
    }

    async fn on_message_edited(&self, id: i64, room_id: i64, content: &str, edited_at: &str) {
        let patched = match self.cache.apply_edit(id, content, edited_at).await {
            Ok(patched) => patched,
            Err(error) => {
                warn!(%error, message_id = id, "could not apply edit");
                false
            }
        };
        if !patched {
            return;
        }
        if self.active_room().await == Some(room_id) {
            self.bus.emit(UiEvent::MessagesUpdated { room_id });
        }
        self.bus.emit(UiEvent::ChatListRefresh);
    }

    async fn on_message_deleted(&self, id: i64, room_id: i64) {
        let removed = match self.cache.delete_by_server_id(id).await {
            Ok(removed) => removed,
            Err(error) => {
                warn!(%error, message_id = id, "could not delete cached message");
                false
            }
        };
        if !removed {
            return;
        }
        if self.active_room().await == Some(room_id) {
            self.bus.emit(UiEvent::MessagesUpdated { room_id });
        }
        self.bus.emit(UiEvent::ChatListRefresh);
    }

    async fn on_status_update(&self, update: PresenceUpdate) {
        self.presence.apply_update(&update).await;
        self.bus.emit(UiEvent::PresenceChanged);
    }
}
