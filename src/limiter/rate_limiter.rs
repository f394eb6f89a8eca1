//! Rate Limiter
//!
//! Fixed-window admission per identity. Fails closed: if the window store
//! cannot be reached the request is denied.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::cache::current_timestamp_ms;
use crate::limiter::WindowStore;

// == Quota Snapshot ==
/// Read-only view of an identity's quota after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    /// Requests allowed per window
    pub limit: u64,
    pub allowed: bool,
    pub remaining: u64,
    /// Unix milliseconds at which the window resets
    pub reset_at: u64,
}

impl QuotaSnapshot {
    /// Reset time in epoch seconds, rounded up.
    pub fn reset_epoch_secs(&self) -> u64 {
        self.reset_at.div_ceil(1000)
    }

    /// Whole seconds until the reset, rounded up, relative to `now_ms`.
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset_at.saturating_sub(now_ms).div_ceil(1000)
    }
}

// == Rate Limiter ==
/// Admit/reject decisions backed by a [`WindowStore`].
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn WindowStore>,
    limit: u64,
    window_secs: u64,
}

impl RateLimiter {
    /// `limit` and `window_secs` are clamped to at least 1 so a first request
    /// is always admitted.
    pub fn new(store: Arc<dyn WindowStore>, limit: u64, window_secs: u64) -> Self {
        Self {
            store,
            limit: limit.max(1),
            window_secs: window_secs.max(1),
        }
    }

    /// Counts one request for `identity` and decides whether it is admitted.
    ///
    /// The request that brings the count to `limit` is the last admitted in
    /// its window.
    pub async fn check(&self, identity: &str) -> QuotaSnapshot {
        let tally = match self
            .store
            .increment_or_create(identity, self.window_secs)
            .await
        {
            Ok(tally) => tally,
            Err(err) => {
                error!(identity, error = %err, "window store unavailable, denying request");
                return self.closed();
            }
        };

        let reset_at = current_timestamp_ms() + tally.ttl_remaining_ms;
        let allowed = tally.count <= self.limit;
        if !allowed {
            debug!(identity, count = tally.count, limit = self.limit, "request throttled");
        }

        QuotaSnapshot {
            limit: self.limit,
            allowed,
            remaining: self.limit.saturating_sub(tally.count),
            reset_at,
        }
    }

    /// Reports the quota for `identity` without consuming any of it.
    pub async fn peek(&self, identity: &str) -> QuotaSnapshot {
        let now = current_timestamp_ms();
        match self.store.get(identity).await {
            Ok(Some(record)) => QuotaSnapshot {
                limit: self.limit,
                allowed: record.count < self.limit,
                remaining: self.limit.saturating_sub(record.count),
                reset_at: record.window_end(),
            },
            Ok(None) => QuotaSnapshot {
                limit: self.limit,
                allowed: true,
                remaining: self.limit,
                reset_at: now + self.window_secs * 1000,
            },
            Err(err) => {
                error!(identity, error = %err, "window store unavailable during quota lookup");
                self.closed()
            }
        }
    }

    fn closed(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            limit: self.limit,
            allowed: false,
            remaining: 0,
            reset_at: current_timestamp_ms() + self.window_secs * 1000,
        }
    }
}
