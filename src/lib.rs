//! DeskChat Client Core
//!
//! The offline-resilience core of the DeskChat admin messaging app:
//! a persistent local cache mirroring server state, an optimistic send
//! path with a reconnect-triggered retry queue, and a realtime
//! reconciler that folds push events into the cache and notifies
//! decoupled UI components through a typed event bus.
//!
//! # Overview
//!
//! The backend is always the system of record; this crate keeps a
//! best-effort mirror so that already-seen rooms and threads render
//! offline, and so composed messages survive connectivity loss:
//!
//! - **`cache`** - SQLite-backed store for rooms, messages and lookup
//!   tables, including the queue of unsent messages
//! - **`outbox`** - the pending → delivered/failed send state machine
//!   and the backoff-governed retry pass
//! - **`realtime`** - the push channel: wire events, the reconciler,
//!   and in-memory presence/typing registries
//! - **`api`** - thin wrappers over the REST endpoints and their
//!   uniform `{success, data, message}` envelope
//! - **`client`** - the [`ChatClient`] context wiring it all together
//!   with an explicit connect/disconnect lifecycle
//!
//! # Usage
//!
//! ```rust,no_run
//! use deskchat::{ChatClient, Config, OutgoingMessage};
//!
//! # async fn example() -> Result<(), deskchat::ClientError> {
//! let config = Config::builder()
//!     .server_url("https://chat.example.com")
//!     .token("bearer-token")
//!     .build()
//!     .expect("valid config");
//!
//! let client = ChatClient::new(config).await?;
//! let mut events = client.subscribe();
//!
//! client.connect().await?;
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         // re-fetch whatever the event touches
//!         let _ = event;
//!     }
//! });
//! let rooms = client.refresh_rooms().await?;
//! client
//!     .send_message(OutgoingMessage::text(rooms[0].id, "On it."))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! All shared state lives behind `tokio::sync` primitives; handlers
//! run to completion per event and the retry pass is sequential within
//! a batch. Nothing here spawns threads of its own besides the push
//! channel's read/write tasks.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod outbox;
pub mod realtime;
pub mod types;

pub use client::ChatClient;
pub use config::{Config, ConfigBuilder};
pub use error::ClientError;
pub use events::{EventBus, UiEvent};
pub use outbox::{RetryPolicy, RetryReport};
pub use types::{
    Admin, Attachment, CachedMessage, ChatMessage, MessageStatus, OutgoingMessage, Room,
    RoomDetails, StarredMessage,
};
