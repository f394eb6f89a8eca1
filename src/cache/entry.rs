//! Cache Entry Module
//!
//! Defines the structure for individual cached search pages with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A serialized result set plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized payload
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl_seconds` from now.
    pub fn new(value: String, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the clock reaches the expiration time, so a
    /// zero TTL entry is never served.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("[]".to_string(), 60);

        assert_eq!(entry.value, "[]");
        assert_eq!(entry.expires_at, entry.created_at + 60_000);
        assert!(!entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("[]".to_string(), 1);

        assert!(!entry.is_expired_at(current_timestamp_ms()));

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: "[]".to_string(),
            created_at: now,
            expires_at: now,
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new("[]".to_string(), 0);
        assert!(entry.is_expired_at(entry.created_at));
    }
}
