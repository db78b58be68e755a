//! Lookup-Table Cache Operations
//!
//! Read-through caches of infrequently-changing lookups: per-room
//! details, the starred-message list and the admin directory. Entries
//! are stored as JSON payloads stamped with an advisory `cached_at`
//! for staleness reasoning; nothing enforces expiry.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Row;

use crate::cache::{CacheStore, Result};
use crate::types::{Admin, RoomDetails, StarredMessage};

/// Lookup row name for the starred-message list
const STARRED_LOOKUP: &str = "starred_messages";
/// Lookup row name for the admin directory
const ADMINS_LOOKUP: &str = "admins";

/// A cached lookup value with the time it was cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    pub value: T,
    pub cached_at: String,
}

impl CacheStore {
    /// Cache the details of a room
    pub async fn put_room_details(&self, details: &RoomDetails, cached_at: &str) -> Result<()> {
        let payload = encode(details)?;
        sqlx::query(
            "INSERT OR REPLACE INTO room_details (room_id, payload, cached_at)
             VALUES (?, ?, ?)",
        )
        .bind(details.room_id)
        .bind(payload)
        .bind(cached_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get cached room details, if any
    pub async fn room_details(&self, room_id: i64) -> Result<Option<Cached<RoomDetails>>> {
        let row = sqlx::query("SELECT payload, cached_at FROM room_details WHERE room_id = ?")
            .bind(room_id)
            .fetch_optional(self.pool())
            .await?;
        row.map(|row| decode_row(&row)).transpose()
    }

    /// Cache the starred-message list
    pub async fn put_starred(&self, starred: &[StarredMessage], cached_at: &str) -> Result<()> {
        self.put_lookup(STARRED_LOOKUP, &starred, cached_at).await
    }

    /// Get the cached starred-message list, if any
    pub async fn starred(&self) -> Result<Option<Cached<Vec<StarredMessage>>>> {
        self.lookup(STARRED_LOOKUP).await
    }

    /// Cache the admin directory
    pub async fn put_admins(&self, admins: &[Admin], cached_at: &str) -> Result<()> {
        self.put_lookup(ADMINS_LOOKUP, &admins, cached_at).await
    }

    /// Get the cached admin directory, if any
    pub async fn admins(&self) -> Result<Option<Cached<Vec<Admin>>>> {
        self.lookup(ADMINS_LOOKUP).await
    }

    async fn put_lookup<T: Serialize>(&self, name: &str, value: &T, cached_at: &str) -> Result<()> {
        let payload = encode(value)?;
        sqlx::query(
            "INSERT OR REPLACE INTO lookups (name, payload, cached_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(payload)
        .bind(cached_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn lookup<T: DeserializeOwned>(&self, name: &str) -> Result<Option<Cached<T>>> {
        let row = sqlx::query("SELECT payload, cached_at FROM lookups WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        row.map(|row| decode_row(&row)).transpose()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn decode_row<T: DeserializeOwned>(row: &sqlx::sqlite::SqliteRow) -> Result<Cached<T>> {
    let payload: String = row.try_get("payload")?;
    let value = serde_json::from_str(&payload).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Cached {
        value,
        cached_at: row.try_get("cached_at")?,
    })
}
