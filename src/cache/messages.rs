//! Message Cache Operations
//!
//! Thread contents plus the optimistic send queue. Rows are reachable
//! by local id, server id, temp id, and in room order via the
//! room+created_at composite index.
//!
//! The send path maintains the invariant that one logical message has
//! exactly one row: `confirm` deletes the temp entry and inserts the
//! server-confirmed replacement; `mark_failed` leaves the temp entry in
//! place for the retry pass.

use sqlx::Row;
use uuid::Uuid;

use crate::cache::{CacheStore, Result};
use crate::types::{Attachment, CachedMessage, ChatMessage, MessageStatus};

impl CacheStore {
    /// Insert an optimistic pending entry for an outbound message.
    ///
    /// Returns the cache-local id of the new row.
    pub async fn insert_pending(
        &self,
        temp_id: &Uuid,
        room_id: i64,
        content: &str,
        attachment: Option<&Attachment>,
        reply_to: Option<i64>,
        created_at: &str,
    ) -> Result<i64> {
        let attachment_json = attachment
            .map(serde_json::to_string)
            .transpose()
            .unwrap_or_default();

        let result = sqlx::query(
            "INSERT INTO messages
                 (temp_id, room_id, content, attachment, reply_to, status, created_at)
             VALUES (?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(temp_id.to_string())
        .bind(room_id)
        .bind(content)
        .bind(attachment_json)
        .bind(reply_to)
        .bind(created_at)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert or replace a server-confirmed message as delivered
    pub async fn insert_delivered(&self, message: &ChatMessage) -> Result<()> {
        let attachment_json = message
            .attachment
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .unwrap_or_default();

        sqlx::query(
            "INSERT OR REPLACE INTO messages
                 (server_id, room_id, sender_id, content, attachment, reply_to,
                  status, created_at, edited_at)
             VALUES (?, ?, ?, ?, ?, ?, 'delivered', ?, ?)",
        )
        .bind(message.id)
        .bind(message.room_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(attachment_json)
        .bind(message.reply_to)
        .bind(&message.created_at)
        .bind(&message.edited_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get a message by its server id
    pub async fn message_by_server_id(&self, server_id: i64) -> Result<Option<CachedMessage>> {
        let row = sqlx::query(&select_where("server_id = ?"))
            .bind(server_id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_cached).transpose()
    }

    /// Get a message by its temp id
    pub async fn message_by_temp_id(&self, temp_id: &Uuid) -> Result<Option<CachedMessage>> {
        let row = sqlx::query(&select_where("temp_id = ?"))
            .bind(temp_id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_cached).transpose()
    }

    /// Whether a server-confirmed entry with this id is already cached
    pub async fn contains_server_id(&self, server_id: i64) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE server_id = ?")
                .bind(server_id)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0 > 0)
    }

    /// Get the messages of a room in creation order
    pub async fn room_messages(&self, room_id: i64) -> Result<Vec<CachedMessage>> {
        let rows = sqlx::query(&select_where("room_id = ? ORDER BY created_at ASC, local_id ASC"))
            .bind(room_id)
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(row_to_cached).collect()
    }

    /// All messages still owned by the send/retry flow, in arrival order
    pub async fn unsent_messages(&self) -> Result<Vec<CachedMessage>> {
        let rows = sqlx::query(&select_where(
            "status IN ('pending', 'failed') ORDER BY local_id ASC",
        ))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(row_to_cached).collect()
    }

    /// Delete an optimistic entry once the server confirms it.
    ///
    /// Returns whether a row was removed.
    pub async fn delete_by_temp_id(&self, temp_id: &Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE temp_id = ?")
            .bind(temp_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a server-confirmed entry (message-deleted push event).
    ///
    /// Returns whether a row was removed.
    pub async fn delete_by_server_id(&self, server_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE server_id = ?")
            .bind(server_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Re-mark an entry pending before a (re)send attempt
    pub async fn mark_pending(&self, temp_id: &Uuid) -> Result<()> {
        sqlx::query("UPDATE messages SET status = 'pending' WHERE temp_id = ?")
            .bind(temp_id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Mark an entry failed after a send attempt, recording the attempt
    pub async fn mark_failed(&self, temp_id: &Uuid, error: &str, at: &str) -> Result<()> {
        sqlx::query(
            "UPDATE messages
             SET status = 'failed',
                 retry_count = retry_count + 1,
                 last_attempt_at = ?,
                 last_error = ?
             WHERE temp_id = ?",
        )
        .bind(at)
        .bind(error)
        .bind(temp_id.to_string())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Patch a message edited on the server.
    ///
    /// Returns whether a cached row was present to patch.
    pub async fn apply_edit(
        &self,
        server_id: i64,
        content: &str,
        edited_at: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE messages SET content = ?, edited_at = ? WHERE server_id = ?",
        )
        .bind(content)
        .bind(edited_at)
        .bind(server_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

const MESSAGE_COLUMNS: &str = "local_id, server_id, temp_id, room_id, sender_id, content, \
     attachment, reply_to, status, retry_count, last_attempt_at, last_error, \
     created_at, edited_at";

fn select_where(clause: &str) -> String {
    format!("SELECT {} FROM messages WHERE {}", MESSAGE_COLUMNS, clause)
}

fn row_to_cached(row: &sqlx::sqlite::SqliteRow) -> Result<CachedMessage> {
    let temp_id: Option<String> = row.try_get("temp_id")?;
    let attachment_json: Option<String> = row.try_get("attachment")?;
    let attachment = attachment_json
        .filter(|json| !json.is_empty())
        .and_then(|json| serde_json::from_str(&json).ok());
    let status: String = row.try_get("status")?;
    let retry_count: i64 = row.try_get("retry_count")?;

    Ok(CachedMessage {
        local_id: row.try_get("local_id")?,
        server_id: row.try_get("server_id")?,
        temp_id: temp_id.and_then(|id| Uuid::parse_str(&id).ok()),
        room_id: row.try_get("room_id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        attachment,
        reply_to: row.try_get("reply_to")?,
        status: MessageStatus::parse(&status),
        retry_count: retry_count as u32,
        last_attempt_at: row.try_get("last_attempt_at")?,
        last_error: row.try_get("last_error")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
    })
}
