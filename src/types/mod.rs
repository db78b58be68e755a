//! Core Data Types
//!
//! Serde-serializable types shared by the REST client, the cache store
//! and the realtime layer: rooms, messages, the admin directory and
//! presence/typing state.

pub mod admin;
pub mod message;
pub mod presence;
pub mod room;

pub use admin::{Admin, StarredMessage};
pub use message::{Attachment, CachedMessage, ChatMessage, MessageStatus, OutgoingMessage};
pub use presence::{ActorKind, PresenceKey, PresenceUpdate};
pub use room::{Room, RoomDetails, RoomMember};
