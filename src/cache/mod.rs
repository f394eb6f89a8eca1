//! Cache Module
//!
//! Read-through caching of search pages: TTL entries, optional LRU bound,
//! in-memory and Redis stores, fingerprints and the query cache manager.

mod entry;
mod fingerprint;
mod lru;
mod manager;
mod redis_store;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use fingerprint::{canonical_query, fingerprint, FINGERPRINT_PREFIX};
pub use lru::LruTracker;
pub use manager::{Provenance, QueryCacheManager, Resolved};
pub use redis_store::RedisCacheStore;
pub use stats::{CacheStats, StatsCounters};
pub use store::{CacheStore, MemoryCacheStore};

// == Public Constants ==
/// Maximum allowed fingerprint length in bytes
pub const MAX_FINGERPRINT_LENGTH: usize = 256;

/// Maximum allowed serialized page size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024; // 1 MB
