//! Retry Policy
//!
//! Backoff and attempt-budget rules for resending queued messages.
//! Delays grow exponentially per attempt up to a cap; entries that
//! exhaust their attempt budget stay `failed` and are excluded from
//! later passes.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::CachedMessage;

/// Retry configuration for the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on the per-attempt delay
    pub max_delay: Duration,
    /// Total send attempts allowed per message
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(300),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// A policy with no delays, for tests and interactive retries
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay to wait after the given number of attempts.
    ///
    /// Exponential in the attempt count, capped at `max_delay`.
    pub fn backoff(&self, attempts_made: u32) -> Duration {
        let shift = attempts_made.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << shift)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether the entry has used up its attempt budget
    pub fn is_exhausted(&self, entry: &CachedMessage) -> bool {
        entry.retry_count >= self.max_attempts
    }

    /// Whether the entry's backoff delay has elapsed at `now`.
    ///
    /// Entries without a recorded attempt, or with an unreadable
    /// timestamp, are due immediately.
    pub fn is_due(&self, entry: &CachedMessage, now: DateTime<Utc>) -> bool {
        if entry.retry_count == 0 {
            return true;
        }
        let Some(last_attempt) = entry
            .last_attempt_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
        else {
            return true;
        };
        let delay = chrono::Duration::from_std(self.backoff(entry.retry_count))
            .unwrap_or_else(|_| chrono::Duration::days(365));
        last_attempt + delay <= now
    }

    /// Whether a pass should attempt this entry at `now`
    pub fn is_eligible(&self, entry: &CachedMessage, now: DateTime<Utc>) -> bool {
        !self.is_exhausted(entry) && self.is_due(entry, now)
    }
}
