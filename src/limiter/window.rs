//! Window Store Module
//!
//! Per-identity fixed-window counters. The in-memory store gives per-key
//! atomicity through the sharded map's entry API and is only correct within
//! a single process.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::cache::current_timestamp_ms;
use crate::error::StoreError;
use crate::tasks::Sweep;

// == Window Record ==
/// Counter state for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub key: String,
    pub count: u64,
    /// Unix milliseconds
    pub window_start: u64,
    pub window_secs: u64,
}

impl WindowRecord {
    /// A record that has just seen its first request.
    pub fn open(key: &str, now_ms: u64, window_secs: u64) -> Self {
        Self {
            key: key.to_string(),
            count: 1,
            window_start: now_ms,
            window_secs,
        }
    }

    /// Unix milliseconds at which the window closes.
    pub fn window_end(&self) -> u64 {
        self.window_start
            .saturating_add(self.window_secs.saturating_mul(1000))
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.window_end()
    }

    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.window_end().saturating_sub(now_ms)
    }
}

// == Window Tally ==
/// Outcome of one counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTally {
    /// Requests seen in the current window, this one included
    pub count: u64,
    /// Time until the window closes
    pub ttl_remaining_ms: u64,
}

// == Window Store Contract ==
/// Counter storage for the rate limiter.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Current live record for `key`; `None` means no history.
    async fn get(&self, key: &str) -> Result<Option<WindowRecord>, StoreError>;

    /// Counts one request for `key`, opening a fresh window when none is live.
    ///
    /// Must be atomic per key: concurrent callers never lose an increment and
    /// an expired window is reset exactly once.
    async fn increment_or_create(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowTally, StoreError>;
}

// == Memory Window Store ==
/// Process-local window store. Empty at startup.
#[derive(Debug, Default)]
pub struct MemoryWindowStore {
    windows: DashMap<String, WindowRecord>,
}

impl MemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn get(&self, key: &str) -> Result<Option<WindowRecord>, StoreError> {
        let now = current_timestamp_ms();
        Ok(self
            .windows
            .get(key)
            .filter(|record| !record.is_expired_at(now))
            .map(|record| record.clone()))
    }

    async fn increment_or_create(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowTally, StoreError> {
        let now = current_timestamp_ms();

        // The entry guard holds the shard lock for the whole read-modify-write
        let tally = match self.windows.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired_at(now) {
                    *record = WindowRecord::open(key, now, window_secs);
                } else {
                    record.count += 1;
                }
                WindowTally {
                    count: record.count,
                    ttl_remaining_ms: record.ttl_remaining_ms(now),
                }
            }
            Entry::Vacant(vacant) => {
                let record = vacant.insert(WindowRecord::open(key, now, window_secs));
                WindowTally {
                    count: record.count,
                    ttl_remaining_ms: record.ttl_remaining_ms(now),
                }
            }
        };

        Ok(tally)
    }
}

impl Sweep for MemoryWindowStore {
    fn name(&self) -> &'static str {
        "rate-limit windows"
    }

    fn sweep_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let before = self.windows.len();
        self.windows.retain(|_, record| !record.is_expired_at(now));
        before.saturating_sub(self.windows.len())
    }
}
