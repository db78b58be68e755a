//! # Send Path and Retry Queue
//!
//! The outbox owns the full lifecycle of outbound messages as one
//! state machine with a single entry point:
//!
//! ```text
//! compose -> pending (optimistic cache entry)
//! pending -> delivered (temp entry deleted, server entry inserted)
//! pending -> failed    (attempt recorded, entry kept for retry)
//! failed  -> pending   (retry pass re-marks before resubmitting)
//! ```
//!
//! Fresh sends notify subscribers per message; the reconnect-triggered
//! retry pass resubmits everything still unsent in arrival order and
//! broadcasts one combined refresh for the whole batch.

pub mod retry;

pub use retry::RetryPolicy;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::cache::CacheStore;
use crate::error::ClientError;
use crate::events::{EventBus, UiEvent};
use crate::types::{CachedMessage, ChatMessage, OutgoingMessage};

/// The outbound message pipeline.
#[derive(Debug, Clone)]
pub struct Outbox {
    cache: Arc<CacheStore>,
    api: Arc<ApiClient>,
    bus: EventBus,
    policy: RetryPolicy,
}

/// Outcome summary of one retry pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Sends attempted this pass
    pub attempted: usize,
    /// Attempts confirmed by the server
    pub delivered: usize,
    /// Attempts that failed again
    pub failed: usize,
    /// Entries skipped because their backoff delay has not elapsed
    pub deferred: usize,
    /// Entries skipped for good: attempt budget exhausted
    pub dead_lettered: usize,
}

impl Outbox {
    pub fn new(
        cache: Arc<CacheStore>,
        api: Arc<ApiClient>,
        bus: EventBus,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            api,
            bus,
            policy,
        }
    }

    /// Send a freshly composed message.
    ///
    /// Writes the optimistic pending entry, submits to the server and
    /// settles the entry to delivered or failed. Cache write failures
    /// are logged, not surfaced: the cache is advisory.
    pub async fn send(&self, draft: OutgoingMessage) -> Result<ChatMessage, ClientError> {
        let temp_id = Uuid::new_v4();
        let created_at = Utc::now().to_rfc3339();
        if let Err(error) = self
            .cache
            .insert_pending(
                &temp_id,
                draft.room_id,
                &draft.content,
                draft.attachment.as_ref(),
                draft.reply_to,
                &created_at,
            )
            .await
        {
            warn!(%error, room_id = draft.room_id, "optimistic cache write failed");
        }
        self.deliver(&temp_id, &draft, true).await
    }

    /// Scan the cache for unsent messages and resubmit them.
    ///
    /// Runs on the offline-to-online transition. Entries are attempted
    /// sequentially in arrival order; one combined chat-list refresh is
    /// broadcast after the batch instead of per-message signals.
    pub async fn run_retry_pass(&self) -> RetryReport {
        let queued = match self.cache.unsent_messages().await {
            Ok(queued) => queued,
            Err(error) => {
                warn!(%error, "retry pass could not scan the cache");
                return RetryReport::default();
            }
        };

        let now = Utc::now();
        let mut report = RetryReport::default();
        for entry in &queued {
            if self.policy.is_exhausted(entry) {
                report.dead_lettered += 1;
                continue;
            }
            if !self.policy.is_due(entry, now) {
                report.deferred += 1;
                continue;
            }
            // Unsent entries always carry a temp id; delivered rows
            // never re-enter the queue.
            let Some(temp_id) = entry.temp_id else {
                continue;
            };

            report.attempted += 1;
            match self.deliver(&temp_id, &draft_from(entry), false).await {
                Ok(_) => report.delivered += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.attempted > 0 {
            self.bus.emit(UiEvent::ChatListRefresh);
        }
        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            deferred = report.deferred,
            dead_lettered = report.dead_lettered,
            "retry pass complete"
        );
        report
    }

    /// The single place where send status transitions happen.
    async fn deliver(
        &self,
        temp_id: &Uuid,
        draft: &OutgoingMessage,
        notify: bool,
    ) -> Result<ChatMessage, ClientError> {
        // Guards against a second pass picking the entry up while the
        // request is in flight.
        if let Err(error) = self.cache.mark_pending(temp_id).await {
            warn!(%error, %temp_id, "could not mark entry pending");
        }

        match self.api.create_message(draft).await {
            Ok(message) => {
                // Two individually atomic steps; a crash in between
                // self-heals on the next thread fetch.
                if let Err(error) = self.cache.delete_by_temp_id(temp_id).await {
                    warn!(%error, %temp_id, "could not drop confirmed temp entry");
                }
                if let Err(error) = self.cache.insert_delivered(&message).await {
                    warn!(%error, message_id = message.id, "could not cache delivered message");
                }
                if let Err(error) = self
                    .cache
                    .touch_room_preview(message.room_id, &message.content, &message.created_at)
                    .await
                {
                    warn!(%error, room_id = message.room_id, "could not update room preview");
                }
                if notify {
                    self.bus.emit(UiEvent::MessagesUpdated {
                        room_id: message.room_id,
                    });
                    self.bus.emit(UiEvent::ChatListRefresh);
                }
                Ok(message)
            }
            Err(error) => {
                let at = Utc::now().to_rfc3339();
                if let Err(cache_error) = self
                    .cache
                    .mark_failed(temp_id, &error.to_string(), &at)
                    .await
                {
                    warn!(%cache_error, %temp_id, "could not record failed attempt");
                }
                if notify {
                    self.bus.emit(UiEvent::MessagesUpdated {
                        room_id: draft.room_id,
                    });
                }
                Err(error)
            }
        }
    }
}

/// Rebuild the submission draft from a queued cache entry
fn draft_from(entry: &CachedMessage) -> OutgoingMessage {
    OutgoingMessage {
        room_id: entry.room_id,
        content: entry.content.clone(),
        attachment: entry.attachment.clone(),
        reply_to: entry.reply_to,
    }
}
