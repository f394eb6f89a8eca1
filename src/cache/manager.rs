//! Query Cache Manager
//!
//! Read-through cache in front of the coupon source. Pages may be served
//! stale for up to the configured TTL; writes to the source never
//! invalidate cached pages.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{fingerprint, CacheStats, CacheStore};
use crate::catalog::{CouponPage, CouponSource, SearchParams};
use crate::error::SourceError;

/// Where a resolved page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Source,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Cache => "cache",
            Provenance::Source => "source",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub page: CouponPage,
    pub provenance: Provenance,
}

/// Fingerprints searches, serves cached pages and repopulates on miss.
#[derive(Clone)]
pub struct QueryCacheManager {
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn CouponSource>,
    ttl_secs: u64,
}

impl QueryCacheManager {
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn CouponSource>, ttl_secs: u64) -> Self {
        Self {
            cache,
            source,
            ttl_secs,
        }
    }

    /// Resolves `params` from the cache, falling back to the source.
    ///
    /// Cache store failures degrade to querying the source. Source failures
    /// propagate unchanged and are never cached.
    pub async fn resolve(&self, params: &SearchParams) -> Result<Resolved, SourceError> {
        let key = fingerprint(params);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<CouponPage>(&payload) {
                Ok(page) => {
                    debug!(fingerprint = %key, "search served from cache");
                    return Ok(Resolved {
                        page,
                        provenance: Provenance::Cache,
                    });
                }
                Err(err) => {
                    warn!(fingerprint = %key, error = %err, "discarding undecodable cached page");
                }
            },
            Ok(None) => debug!(fingerprint = %key, "cache miss"),
            Err(err) => {
                warn!(fingerprint = %key, error = %err, "cache store unavailable, querying source directly");
            }
        }

        let page = self.source.query(params).await?;

        match serde_json::to_string(&page) {
            Ok(payload) => {
                if let Err(err) = self.cache.set(&key, payload, self.ttl_secs).await {
                    warn!(fingerprint = %key, error = %err, "failed to populate cache");
                }
            }
            Err(err) => warn!(fingerprint = %key, error = %err, "failed to serialize page"),
        }

        Ok(Resolved {
            page,
            provenance: Provenance::Source,
        })
    }

    /// Records a vote on the source. Cached pages keep their old scores
    /// until they expire.
    pub async fn vote(&self, coupon_id: u64, up: bool) -> Result<bool, SourceError> {
        self.source.vote(coupon_id, up).await
    }

    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.stats()
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
