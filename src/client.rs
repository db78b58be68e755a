//! # Client Context
//!
//! [`ChatClient`] is the explicitly constructed context object owning
//! every component of the client core: configuration, cache store, API
//! client, event bus, outbox and the realtime connection. There is no
//! module-level state; the embedding application creates the context
//! at startup and tears the push channel down with it.
//!
//! Read paths are read-through: fetches refresh the cache mirror, and
//! when the network fails the cached copy of already-seen data is
//! served instead. Cache write failures never block a path; they are
//! logged and the mirror self-heals on the next fetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ClientError;
use crate::events::{EventBus, UiEvent};
use crate::outbox::{Outbox, RetryReport};
use crate::realtime::{
    ClientEvent, PresenceRegistry, RealtimeConnection, Reconciler, TypingRegistry,
};
use crate::types::{
    Admin, CachedMessage, ChatMessage, OutgoingMessage, Room, RoomDetails, StarredMessage,
};

/// The client core context.
pub struct ChatClient {
    config: Config,
    cache: Arc<CacheStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    outbox: Outbox,
    presence: Arc<PresenceRegistry>,
    typing: Arc<TypingRegistry>,
    reconciler: Arc<Reconciler>,
    realtime: Mutex<Option<RealtimeConnection>>,
    online: AtomicBool,
}

impl ChatClient {
    /// Create a context with the cache at its configured location.
    pub async fn new(config: Config) -> Result<Self, ClientError> {
        let cache = match config.cache_path() {
            Some(path) => CacheStore::open(path).await?,
            None => CacheStore::open_default().await?,
        };
        Ok(Self::with_cache(config, Arc::new(cache)))
    }

    /// Wire a context around an injected cache store.
    pub fn with_cache(config: Config, cache: Arc<CacheStore>) -> Self {
        let api = Arc::new(ApiClient::new(config.clone()));
        let bus = EventBus::new();
        let presence = Arc::new(PresenceRegistry::new());
        let typing = Arc::new(TypingRegistry::new());
        let reconciler = Arc::new(Reconciler::new(
            cache.clone(),
            bus.clone(),
            presence.clone(),
            typing.clone(),
        ));
        let outbox = Outbox::new(
            cache.clone(),
            api.clone(),
            bus.clone(),
            config.retry_policy().clone(),
        );
        Self {
            config,
            cache,
            api,
            bus,
            outbox,
            presence,
            typing,
            reconciler,
            realtime: Mutex::new(None),
            online: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn typing(&self) -> &TypingRegistry {
        &self.typing
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Subscribe to UI refresh events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.bus.subscribe()
    }

    // ---- rooms -------------------------------------------------------

    /// Fetch the room list and refresh the cached chat list.
    ///
    /// Serves the cached mirror when the network fails.
    pub async fn refresh_rooms(&self) -> Result<Vec<Room>, ClientError> {
        match self.api.list_rooms().await {
            Ok(rooms) => {
                if let Err(error) = self.cache.replace_rooms(&rooms).await {
                    warn!(%error, "could not refresh cached room list");
                }
                self.bus.emit(UiEvent::ChatListRefresh);
                Ok(rooms)
            }
            Err(error) => {
                warn!(%error, "room list fetch failed, serving cached mirror");
                match self.cache.rooms().await {
                    Ok(cached) => Ok(cached),
                    Err(_) => Err(error),
                }
            }
        }
    }

    /// Fetch a room's details, read-through cached with a `cached_at`
    /// stamp.
    pub async fn room_details(&self, room_id: i64) -> Result<RoomDetails, ClientError> {
        match self.api.room_details(room_id).await {
            Ok(details) => {
                let cached_at = Utc::now().to_rfc3339();
                if let Err(error) = self.cache.put_room_details(&details, &cached_at).await {
                    warn!(%error, room_id, "could not cache room details");
                }
                Ok(details)
            }
            Err(error) => match self.cache.room_details(room_id).await {
                Ok(Some(cached)) => Ok(cached.value),
                _ => Err(error),
            },
        }
    }

    // ---- messages ----------------------------------------------------

    /// Fetch a room's thread into the cache and return the merged local
    /// view, unsent entries included.
    ///
    /// When the network fails, the cached thread is served as-is.
    pub async fn room_messages(&self, room_id: i64) -> Result<Vec<CachedMessage>, ClientError> {
        match self.api.room_messages(room_id).await {
            Ok(messages) => {
                for message in &messages {
                    if let Err(error) = self.cache.insert_delivered(message).await {
                        warn!(%error, message_id = message.id, "could not mirror message");
                    }
                }
            }
            Err(error) => {
                warn!(%error, room_id, "thread fetch failed, serving cached mirror");
            }
        }
        self.cache.room_messages(room_id).await.map_err(Into::into)
    }

    /// Send a composed message through the outbox
    pub async fn send_message(&self, draft: OutgoingMessage) -> Result<ChatMessage, ClientError> {
        self.outbox.send(draft).await
    }

    /// Full-text message search; passthrough, never cached
    pub async fn search(&self, query: &str) -> Result<Vec<ChatMessage>, ClientError> {
        self.api.search_messages(query).await
    }

    /// Fetch the starred-message list, read-through cached
    pub async fn starred_messages(&self) -> Result<Vec<StarredMessage>, ClientError> {
        match self.api.starred_messages().await {
            Ok(starred) => {
                let cached_at = Utc::now().to_rfc3339();
                if let Err(error) = self.cache.put_starred(&starred, &cached_at).await {
                    warn!(%error, "could not cache starred messages");
                }
                Ok(starred)
            }
            Err(error) => match self.cache.starred().await {
                Ok(Some(cached)) => Ok(cached.value),
                _ => Err(error),
            },
        }
    }

    /// Star or unstar a message; the starred lookup refreshes on its
    /// next read-through fetch
    pub async fn set_message_starred(
        &self,
        message_id: i64,
        starred: bool,
    ) -> Result<(), ClientError> {
        self.api.set_message_starred(message_id, starred).await
    }

    /// Fetch the admin directory, read-through cached
    pub async fn admins(&self) -> Result<Vec<Admin>, ClientError> {
        match self.api.list_admins().await {
            Ok(admins) => {
                let cached_at = Utc::now().to_rfc3339();
                if let Err(error) = self.cache.put_admins(&admins, &cached_at).await {
                    warn!(%error, "could not cache admin directory");
                }
                Ok(admins)
            }
            Err(error) => match self.cache.admins().await {
                Ok(Some(cached)) => Ok(cached.value),
                _ => Err(error),
            },
        }
    }

    // ---- connectivity ------------------------------------------------

    /// Record a connectivity change.
    ///
    /// Edge-triggered: the offline-to-online transition runs a retry
    /// pass over everything still unsent.
    pub async fn set_online(&self, online: bool) -> Option<RetryReport> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            info!("connectivity restored, retrying unsent messages");
            return Some(self.outbox.run_retry_pass().await);
        }
        if !online && was_online {
            info!("connectivity lost");
        }
        None
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Manually run a retry pass over unsent messages
    pub async fn retry_unsent(&self) -> RetryReport {
        self.outbox.run_retry_pass().await
    }

    /// Record which room the UI is currently showing; scopes the
    /// reconciler's thread-refresh signals
    pub async fn set_active_room(&self, room_id: Option<i64>) {
        self.reconciler.set_active_room(room_id).await;
    }

    // ---- realtime lifecycle ------------------------------------------

    /// Establish the push channel.
    ///
    /// Idempotent while a connection is alive; a dead connection is
    /// replaced.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut realtime = self.realtime.lock().await;
        if let Some(connection) = realtime.as_ref() {
            if connection.is_alive() {
                return Ok(());
            }
        }
        let connection = RealtimeConnection::connect(&self.config, self.reconciler.clone()).await?;
        *realtime = Some(connection);
        Ok(())
    }

    /// Tear the push channel down
    pub async fn disconnect(&self) {
        let mut realtime = self.realtime.lock().await;
        if realtime.take().is_some() {
            info!("push channel disconnected");
        }
    }

    /// Whether the push channel is currently up
    pub async fn is_connected(&self) -> bool {
        self.realtime
            .lock()
            .await
            .as_ref()
            .map(RealtimeConnection::is_alive)
            .unwrap_or(false)
    }

    /// Acknowledge messages as read over the push channel
    pub async fn mark_room_read(
        &self,
        room_id: i64,
        status_ids: Vec<i64>,
    ) -> Result<(), ClientError> {
        let realtime = self.realtime.lock().await;
        match realtime.as_ref() {
            Some(connection) => connection.send(ClientEvent::MarkAsRead { room_id, status_ids }).await,
            None => Err(ClientError::NotConnected),
        }
    }
}
