//! Room Cache Operations
//!
//! The chat list is replaced wholesale whenever the server room list is
//! fetched; only the most-recently-active rooms survive the cap.
//! Reconciler events touch individual rooms in place.

use chrono::DateTime;
use sqlx::Row;

use crate::cache::{CacheStore, Result, ROOM_CACHE_LIMIT};
use crate::types::Room;

impl CacheStore {
    /// Replace the cached room list.
    ///
    /// Keeps at most [`ROOM_CACHE_LIMIT`] rooms, most recently active
    /// first (by last-message timestamp); the rest are discarded.
    pub async fn replace_rooms(&self, rooms: &[Room]) -> Result<()> {
        let mut sorted: Vec<&Room> = rooms.iter().collect();
        sorted.sort_by_key(|room| std::cmp::Reverse(activity_key(room)));
        sorted.truncate(ROOM_CACHE_LIMIT);

        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM rooms").execute(&mut *tx).await?;
        for room in sorted {
            sqlx::query(
                "INSERT OR REPLACE INTO rooms
                     (id, name, avatar_url, last_message, last_message_at, unread_count)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(room.id)
            .bind(&room.name)
            .bind(&room.avatar_url)
            .bind(&room.last_message)
            .bind(&room.last_message_at)
            .bind(room.unread_count)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert or update a single room
    pub async fn upsert_room(&self, room: &Room) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO rooms
                 (id, name, avatar_url, last_message, last_message_at, unread_count)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(&room.avatar_url)
        .bind(&room.last_message)
        .bind(&room.last_message_at)
        .bind(room.unread_count)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get cached rooms, most recently active first
    pub async fn rooms(&self) -> Result<Vec<Room>> {
        let rows = sqlx::query(
            "SELECT id, name, avatar_url, last_message, last_message_at, unread_count
             FROM rooms
             ORDER BY last_message_at IS NULL, last_message_at DESC",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_room).collect()
    }

    /// Get a single cached room
    pub async fn room(&self, room_id: i64) -> Result<Option<Room>> {
        let row = sqlx::query(
            "SELECT id, name, avatar_url, last_message, last_message_at, unread_count
             FROM rooms
             WHERE id = ?",
        )
        .bind(room_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(row_to_room).transpose()
    }

    /// Update a room's last-message preview and activity timestamp
    pub async fn touch_room_preview(
        &self,
        room_id: i64,
        preview: &str,
        at: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE rooms SET last_message = ?, last_message_at = ? WHERE id = ?",
        )
        .bind(preview)
        .bind(at)
        .bind(room_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

/// Sort key for room activity; rooms without a last message sort last.
fn activity_key(room: &Room) -> i64 {
    room.last_message_at
        .as_deref()
        .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
        .map(|at| at.timestamp_millis())
        .unwrap_or(i64::MIN)
}

fn row_to_room(row: &sqlx::sqlite::SqliteRow) -> Result<Room> {
    Ok(Room {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        avatar_url: row.try_get("avatar_url")?,
        last_message: row.try_get("last_message")?,
        last_message_at: row.try_get("last_message_at")?,
        unread_count: row.try_get("unread_count")?,
    })
}
