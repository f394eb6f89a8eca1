//! Cache Store Module
//!
//! Fingerprint -> serialized page storage with TTL expiry. The in-memory
//! store keeps entries in a sharded map and optionally bounds its size with
//! LRU eviction.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::cache::{
    current_timestamp_ms, CacheEntry, CacheStats, LruTracker, StatsCounters,
    MAX_FINGERPRINT_LENGTH, MAX_PAYLOAD_SIZE,
};
use crate::error::StoreError;
use crate::tasks::Sweep;

// == Cache Store Contract ==
/// Key-value store for cached search pages.
///
/// Concurrent `set` calls for one fingerprint are last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live payload for `fingerprint`, `None` when absent or expired.
    async fn get(&self, fingerprint: &str) -> Result<Option<String>, StoreError>;

    /// Stores `payload` under `fingerprint` for `ttl_secs`.
    async fn set(&self, fingerprint: &str, payload: String, ttl_secs: u64)
        -> Result<(), StoreError>;

    /// Local statistics, when the store keeps any.
    fn stats(&self) -> Option<CacheStats> {
        None
    }
}

// == Memory Cache Store ==
/// Process-local cache store. Empty at startup, gone at exit.
#[derive(Debug)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
    /// Present only when the store is bounded
    lru: Option<Mutex<LruTracker>>,
    stats: StatsCounters,
    max_entries: usize,
}

impl MemoryCacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` pages (0 = unbounded).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            lru: (max_entries > 0).then(|| Mutex::new(LruTracker::new())),
            stats: StatsCounters::new(),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate(fingerprint: &str, payload: &str) -> Result<(), StoreError> {
        if fingerprint.is_empty() || fingerprint.len() > MAX_FINGERPRINT_LENGTH {
            return Err(StoreError::Rejected(format!(
                "Fingerprint must be 1..={} bytes",
                MAX_FINGERPRINT_LENGTH
            )));
        }
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(StoreError::Rejected(format!(
                "Payload exceeds maximum size of {} bytes",
                MAX_PAYLOAD_SIZE
            )));
        }
        Ok(())
    }

    /// Evicts least recently used pages until one more fits. The caller
    /// holds the tracker lock until its insert is done.
    fn evict_for_insert(&self, lru: &mut LruTracker) {
        while self.entries.len() >= self.max_entries {
            match lru.evict_oldest() {
                Some(victim) => {
                    if self.entries.remove(&victim).is_some() {
                        self.stats.record_eviction();
                    }
                }
                None => break,
            }
        }
    }

    fn touch(&self, fingerprint: &str) {
        if let Some(lru) = &self.lru {
            lru.lock().touch(fingerprint);
        }
    }

    fn forget(&self, fingerprint: &str) {
        if let Some(lru) = &self.lru {
            lru.lock().remove(fingerprint);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, fingerprint: &str) -> Result<Option<String>, StoreError> {
        let now = current_timestamp_ms();
        let value = self
            .entries
            .get(fingerprint)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.value.clone()));

        match value {
            Some(Some(payload)) => {
                self.stats.record_hit();
                self.touch(fingerprint);
                Ok(Some(payload))
            }
            Some(None) => {
                // Lazy expiry; re-check so a concurrent fresh set survives
                self.entries
                    .remove_if(fingerprint, |_, entry| entry.is_expired_at(now));
                if !self.entries.contains_key(fingerprint) {
                    self.forget(fingerprint);
                }
                self.stats.record_miss();
                Ok(None)
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        fingerprint: &str,
        payload: String,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        Self::validate(fingerprint, &payload)?;

        let entry = CacheEntry::new(payload, ttl_secs);
        let Some(lru) = &self.lru else {
            self.entries.insert(fingerprint.to_string(), entry);
            return Ok(());
        };

        // Evict, insert and touch under one lock so the bound holds across
        // concurrent sets
        let mut lru = lru.lock();
        if !self.entries.contains_key(fingerprint) {
            self.evict_for_insert(&mut lru);
        }
        self.entries.insert(fingerprint.to_string(), entry);
        lru.touch(fingerprint);
        Ok(())
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(self.stats.snapshot(self.entries.len()))
    }
}

impl Sweep for MemoryCacheStore {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn sweep_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut expired = Vec::new();

        self.entries.retain(|fingerprint, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                expired.push(fingerprint.clone());
            }
            keep
        });

        for fingerprint in &expired {
            self.forget(fingerprint);
        }
        expired.len()
    }
}
