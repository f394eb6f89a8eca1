//! Response DTOs for the gate API
//!
//! Defines the structure of outgoing HTTP response bodies that are not the
//! coupon page itself.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::limiter::QuotaSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of cached pages
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Cache TTL in seconds
    pub ttl_secs: u64,
    /// False when the cache lives in a shared store that keeps no local stats
    pub local: bool,
}

impl StatsResponse {
    /// Builds the response from optional local statistics.
    pub fn new(stats: Option<CacheStats>, ttl_secs: u64) -> Self {
        let local = stats.is_some();
        let stats = stats.unwrap_or_default();
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            ttl_secs,
            local,
        }
    }
}

/// Response body for the quota endpoint (GET /api/quota)
#[derive(Debug, Clone, Serialize)]
pub struct QuotaResponse {
    pub limit: u64,
    pub remaining: u64,
    /// Reset time in epoch seconds
    pub reset: u64,
}

impl From<QuotaSnapshot> for QuotaResponse {
    fn from(snapshot: QuotaSnapshot) -> Self {
        Self {
            limit: snapshot.limit,
            remaining: snapshot.remaining,
            reset: snapshot.reset_epoch_secs(),
        }
    }
}

/// Response body for the vote endpoints
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub message: String,
    pub coupon_id: u64,
}

impl VoteResponse {
    pub fn new(coupon_id: u64, up: bool) -> Self {
        let direction = if up { "Upvote" } else { "Downvote" };
        Self {
            message: format!("{} recorded for coupon {}", direction, coupon_id),
            coupon_id,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
