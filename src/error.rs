//! Client Error Types
//!
//! Error taxonomy for the client core:
//!
//! - `Http` / `Api` - network and API failures, surfaced as structured
//!   results to the call site, never panics
//! - `Cache` - cache store failures; the client layer logs and swallows
//!   these because the cache is advisory, not the system of record
//! - `Realtime` / `NotConnected` - push channel failures; the
//!   connection stays down until the caller reconnects

use thiserror::Error;

/// Errors produced by the client core.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP failure (connection refused, timeout, TLS)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `success: false` or a non-2xx status
    #[error("api error: {message}")]
    Api {
        /// Human-readable error message from the response envelope
        message: String,
    },

    /// Local cache store failure
    #[error("cache error: {0}")]
    Cache(#[from] sqlx::Error),

    /// JSON encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Push channel failure
    #[error("realtime error: {message}")]
    Realtime {
        /// Human-readable error message
        message: String,
    },

    /// An operation required the push channel but it is not connected
    #[error("realtime channel is not connected")]
    NotConnected,
}

impl ClientError {
    /// Create a new API error
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new realtime error
    pub fn realtime(message: impl Into<String>) -> Self {
        Self::Realtime {
            message: message.into(),
        }
    }
}
