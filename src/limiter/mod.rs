//! Limiter Module
//!
//! Fixed-window rate limiting keyed by client identity, with in-memory and
//! Redis window stores.

mod rate_limiter;
mod redis_store;
mod window;

pub use rate_limiter::{QuotaSnapshot, RateLimiter};
pub use redis_store::RedisWindowStore;
pub use window::{MemoryWindowStore, WindowRecord, WindowStore, WindowTally};
