//! UI Refresh Event Bus
//!
//! Decoupled UI components subscribe here to decide when to re-fetch or
//! re-render. Events are a tagged union rather than name-keyed custom
//! events, so subscribers match on variants instead of strings.
//!
//! The bus is a thin wrapper over a `tokio::sync::broadcast` channel:
//! emitting with no subscribers is fine, and slow subscribers miss
//! events rather than blocking the writers (cache and reconciler).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Refresh events are coalescable
/// hints, so a bounded backlog is acceptable.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A refresh hint broadcast to UI components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UiEvent {
    /// The message list of one room changed
    MessagesUpdated { room_id: i64 },
    /// The room list (ordering, previews, membership) changed
    ChatListRefresh,
    /// The server reported a new unread counter for a room
    UnreadCountUpdated { room_id: i64, unread: i64 },
    /// The online-users map changed
    PresenceChanged,
    /// The set of people typing in a room changed
    TypingChanged { room_id: i64 },
}

/// Broadcast bus for [`UiEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    /// Create a new bus
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to refresh events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// A send error only means there are no subscribers right now,
    /// which is not a failure for refresh hints.
    pub fn emit(&self, event: UiEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!(?event, "no subscribers for ui event");
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
