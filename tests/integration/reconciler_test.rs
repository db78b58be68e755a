//! Realtime reconciler integration tests
//!
//! Feeds push events straight into the reconciler and checks the cache
//! mutations and broadcast signals against each other.

use std::sync::Arc;

use deskchat::cache::CacheStore;
use deskchat::events::EventBus;
use deskchat::realtime::{PresenceRegistry, PushEvent, Reconciler, TypingRegistry};
use deskchat::types::{ActorKind, ChatMessage, PresenceKey, PresenceUpdate, Room};
use deskchat::UiEvent;
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

use crate::common::drain_events;

struct Harness {
    cache: Arc<CacheStore>,
    presence: Arc<PresenceRegistry>,
    typing: Arc<TypingRegistry>,
    reconciler: Reconciler,
    events: broadcast::Receiver<UiEvent>,
}

async fn harness() -> Harness {
    let cache = Arc::new(CacheStore::open_in_memory().await.unwrap());
    let bus = EventBus::new();
    let presence = Arc::new(PresenceRegistry::new());
    let typing = Arc::new(TypingRegistry::new());
    let events = bus.subscribe();
    let reconciler = Reconciler::new(cache.clone(), bus, presence.clone(), typing.clone());
    Harness {
        cache,
        presence,
        typing,
        reconciler,
        events,
    }
}

fn message(id: i64, room_id: i64, content: &str) -> ChatMessage {
    ChatMessage {
        id,
        room_id,
        sender_id: 2,
        content: content.to_string(),
        attachment: None,
        reply_to: None,
        created_at: "2026-03-01T10:00:00Z".to_string(),
        edited_at: None,
    }
}

#[tokio::test]
async fn test_new_message_inserts_and_updates_preview() {
    let mut h = harness().await;
    h.cache
        .upsert_room(&Room {
            id: 3,
            name: "Support".to_string(),
            avatar_url: None,
            last_message: None,
            last_message_at: None,
            unread_count: 0,
        })
        .await
        .unwrap();

    h.reconciler
        .handle(PushEvent::NewMessage(message(10, 3, "incoming")))
        .await;

    let thread = h.cache.room_messages(3).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].server_id, Some(10));

    let room = h.cache.room(3).await.unwrap().unwrap();
    assert_eq!(room.last_message.as_deref(), Some("incoming"));

    assert_eq!(
        drain_events(&mut h.events),
        vec![UiEvent::MessagesUpdated { room_id: 3 }, UiEvent::ChatListRefresh]
    );
}

#[tokio::test]
async fn test_duplicate_new_message_is_idempotent() {
    let mut h = harness().await;

    h.reconciler
        .handle(PushEvent::NewMessage(message(10, 3, "incoming")))
        .await;
    drain_events(&mut h.events);

    // The realtime echo of an already-cached message: no new entry,
    // no redundant signal
    h.reconciler
        .handle(PushEvent::NewMessage(message(10, 3, "incoming")))
        .await;

    assert_eq!(h.cache.room_messages(3).await.unwrap().len(), 1);
    assert!(drain_events(&mut h.events).is_empty());
}

#[tokio::test]
async fn test_deleted_in_inactive_room_refreshes_chat_list_only() {
    let mut h = harness().await;
    h.cache.insert_delivered(&message(21, 8, "bye")).await.unwrap();
    h.reconciler.set_active_room(Some(1)).await;
    drain_events(&mut h.events);

    h.reconciler
        .handle(PushEvent::MessageDeleted { id: 21, room_id: 8 })
        .await;

    assert!(h.cache.message_by_server_id(21).await.unwrap().is_none());
    assert_eq!(drain_events(&mut h.events), vec![UiEvent::ChatListRefresh]);
}

#[tokio::test]
async fn test_deleted_in_active_room_refreshes_thread_too() {
    let mut h = harness().await;
    h.cache.insert_delivered(&message(22, 8, "bye")).await.unwrap();
    h.reconciler.set_active_room(Some(8)).await;

    h.reconciler
        .handle(PushEvent::MessageDeleted { id: 22, room_id: 8 })
        .await;

    assert_eq!(
        drain_events(&mut h.events),
        vec![UiEvent::MessagesUpdated { room_id: 8 }, UiEvent::ChatListRefresh]
    );
}

#[tokio::test]
async fn test_deleted_unknown_message_is_silent() {
    let mut h = harness().await;
    h.reconciler
        .handle(PushEvent::MessageDeleted { id: 99, room_id: 8 })
        .await;
    assert!(drain_events(&mut h.events).is_empty());
}

#[tokio::test]
async fn test_edit_patches_cached_message() {
    let mut h = harness().await;
    h.cache.insert_delivered(&message(30, 5, "typo")).await.unwrap();
    h.reconciler.set_active_room(Some(5)).await;

    h.reconciler
        .handle(PushEvent::MessageEdited {
            id: 30,
            room_id: 5,
            content: "fixed".to_string(),
            edited_at: "2026-03-01T10:05:00Z".to_string(),
        })
        .await;

    let entry = h.cache.message_by_server_id(30).await.unwrap().unwrap();
    assert_eq!(entry.content, "fixed");
    assert_eq!(entry.edited_at.as_deref(), Some("2026-03-01T10:05:00Z"));
    assert_eq!(
        drain_events(&mut h.events),
        vec![UiEvent::MessagesUpdated { room_id: 5 }, UiEvent::ChatListRefresh]
    );
}

#[tokio::test]
async fn test_presence_snapshot_then_incremental_offline() {
    let mut h = harness().await;

    h.reconciler
        .handle(PushEvent::InitialOnlineUsers {
            users: vec![PresenceUpdate {
                kind: ActorKind::Admin,
                id: 1,
                is_online: true,
            }],
        })
        .await;

    let admin_one = PresenceKey {
        kind: ActorKind::Admin,
        id: 1,
    };
    assert_eq!(h.presence.online_count().await, 1);
    assert!(h.presence.is_online(admin_one).await);

    h.reconciler
        .handle(PushEvent::UserStatusUpdate(PresenceUpdate {
            kind: ActorKind::Admin,
            id: 1,
            is_online: false,
        }))
        .await;

    assert_eq!(h.presence.online_count().await, 0);
    assert_eq!(
        drain_events(&mut h.events),
        vec![UiEvent::PresenceChanged, UiEvent::PresenceChanged]
    );
}

#[tokio::test]
async fn test_typing_update_is_last_write_wins() {
    let mut h = harness().await;

    h.reconciler
        .handle(PushEvent::TypingUpdate {
            room_id: 4,
            users: vec!["alice".to_string(), "bob".to_string()],
        })
        .await;
    h.reconciler
        .handle(PushEvent::TypingUpdate {
            room_id: 4,
            users: vec!["bob".to_string()],
        })
        .await;

    assert_eq!(h.typing.typing_in(4).await, vec!["bob".to_string()]);
    assert_eq!(
        drain_events(&mut h.events),
        vec![
            UiEvent::TypingChanged { room_id: 4 },
            UiEvent::TypingChanged { room_id: 4 },
        ]
    );
}

#[tokio::test]
async fn test_unread_count_is_passthrough() {
    let mut h = harness().await;
    let before = h.cache.stats().await.unwrap();

    h.reconciler
        .handle(PushEvent::UnreadCountUpdate {
            room_id: 4,
            unread: 7,
        })
        .await;

    // Signal only; no cache mutation
    let after = h.cache.stats().await.unwrap();
    assert_eq!(before.message_count, after.message_count);
    assert_eq!(before.room_count, after.room_count);
    assert_eq!(
        drain_events(&mut h.events),
        vec![UiEvent::UnreadCountUpdated { room_id: 4, unread: 7 }]
    );
}
