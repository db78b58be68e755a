//! # Local Cache Store
//!
//! A persistent SQLite mirror of already-seen server state, used to
//! render rooms and message threads while offline and to hold the
//! outbound queue of unsent messages.
//!
//! ## Collections
//!
//! - **rooms** - the chat list, bulk-replaced on refresh and capped at
//!   the most-recently-active rooms
//! - **messages** - thread contents plus the optimistic send queue,
//!   addressable by local id, server id, temp id, and the
//!   room+created_at composite
//! - **room_details / lookups** - read-through caches of
//!   infrequently-changing lookups, stamped with an advisory `cached_at`
//!
//! ## Failure semantics
//!
//! Every operation is best-effort. Callers on the UI path log failures
//! and carry on; the backend remains the system of record and the cache
//! self-heals on the next fetch.

pub mod lookups;
pub mod messages;
pub mod rooms;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Result as SqlxResult, SqlitePool};

pub use lookups::Cached;

/// Result type for cache operations
pub type Result<T> = SqlxResult<T>;

/// The chat list keeps at most this many rooms, most recent first.
pub const ROOM_CACHE_LIMIT: usize = 15;

/// Cache store connection manager.
///
/// Wraps the SQLite connection pool and provides the collection
/// operations defined in the submodules.
#[derive(Debug, Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    /// Open or create the cache database at the given path.
    ///
    /// Creates the file if missing and initializes the schema. Uses WAL
    /// mode for better concurrency.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;
        sqlx::query("PRAGMA temp_store=MEMORY").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open the cache at the platform data directory.
    pub async fn open_default() -> Result<Self> {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("deskchat");
        path.push("cache.db");
        Self::open(&path).await
    }

    /// Open an in-memory cache.
    ///
    /// A single pooled connection keeps the in-memory database alive
    /// for the lifetime of the store.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create all tables and indices
    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get basic statistics for debugging
    pub async fn stats(&self) -> Result<CacheStats> {
        let room_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        let message_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        let unsent_count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE status IN ('pending', 'failed')",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CacheStats {
            room_count: room_count.0 as u64,
            message_count: message_count.0 as u64,
            unsent_count: unsent_count.0 as u64,
        })
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Rooms currently cached
    pub room_count: u64,
    /// Messages currently cached
    pub message_count: u64,
    /// Messages still owned by the send/retry flow
    pub unsent_count: u64,
}
