//! LRU Tracker Module
//!
//! Recency ordering for the optional size bound on in-memory cached pages.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks fingerprint access order for LRU eviction.
///
/// Every touch stamps the fingerprint with a monotonically increasing tick.
/// The smallest tick is the least recently used fingerprint.
#[derive(Debug, Default)]
pub struct LruTracker {
    next_tick: u64,
    /// fingerprint -> last access tick
    ticks: HashMap<String, u64>,
    /// access tick -> fingerprint
    order: BTreeMap<u64, String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a fingerprint as most recently used.
    pub fn touch(&mut self, fingerprint: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        if let Some(previous) = self.ticks.insert(fingerprint.to_string(), tick) {
            self.order.remove(&previous);
        }
        self.order.insert(tick, fingerprint.to_string());
    }

    // == Remove ==
    /// Stops tracking a fingerprint.
    pub fn remove(&mut self, fingerprint: &str) {
        if let Some(tick) = self.ticks.remove(fingerprint) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used fingerprint.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, fingerprint) = self.order.pop_first()?;
        self.ticks.remove(&fingerprint);
        Some(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch("fp1");
        lru.touch("fp2");
        lru.touch("fp3");
        lru.touch("fp1");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.evict_oldest(), Some("fp2".to_string()));
    }

    #[test]
    fn test_lru_evict_order() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");
        lru.touch("c");
        lru.touch("b");

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruTracker::new();

        lru.touch("fp1");
        lru.touch("fp2");
        lru.remove("fp1");
        lru.remove("missing");

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some("fp2".to_string()));
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruTracker::new();

        lru.touch("fp1");
        lru.touch("fp1");
        lru.touch("fp1");

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some("fp1".to_string()));
        assert!(lru.is_empty());
    }
}
