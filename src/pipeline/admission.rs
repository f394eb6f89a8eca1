//! Request Admission Pipeline
//!
//! limiter check -> parameter validation -> cache manager lookup. Every
//! outcome carries the caller's quota snapshot. Nothing here retries.

use std::convert::Infallible;

use tracing::{error, info};

use crate::cache::{QueryCacheManager, Resolved};
use crate::error::GateError;
use crate::limiter::{QuotaSnapshot, RateLimiter};
use crate::models::SearchQuery;
use crate::pipeline::ParamBounds;

/// Terminal outcome of one admission, with quota accounting attached.
#[derive(Debug)]
pub struct Admission<T = Resolved> {
    pub quota: QuotaSnapshot,
    pub result: Result<T, GateError>,
}

impl<T> Admission<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Orchestrates admission for the search endpoint.
#[derive(Clone)]
pub struct AdmissionPipeline {
    limiter: RateLimiter,
    manager: QueryCacheManager,
    bounds: ParamBounds,
}

impl AdmissionPipeline {
    pub fn new(limiter: RateLimiter, manager: QueryCacheManager, bounds: ParamBounds) -> Self {
        Self {
            limiter,
            manager,
            bounds,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn manager(&self) -> &QueryCacheManager {
        &self.manager
    }

    /// Counts one request. A denied check is returned as the finished
    /// admission.
    async fn throttle<T>(&self, identity: &str) -> Result<QuotaSnapshot, Admission<T>> {
        let quota = self.limiter.check(identity).await;
        if quota.allowed {
            Ok(quota)
        } else {
            Err(Admission {
                quota,
                result: Err(GateError::Throttled {
                    reset_at: quota.reset_at,
                }),
            })
        }
    }

    /// Admits one search request from `identity`.
    pub async fn admit(&self, identity: &str, query: &SearchQuery) -> Admission {
        let quota = match self.throttle(identity).await {
            Ok(quota) => quota,
            Err(denied) => return denied,
        };

        let params = match self.bounds.validate(query) {
            Ok(params) => params,
            Err(err) => {
                info!(identity, error = %err, "rejected invalid search request");
                return Admission {
                    quota,
                    result: Err(err),
                };
            }
        };

        let result = self.manager.resolve(&params).await.map_err(|err| {
            error!(identity, error = %err, "coupon source query failed");
            GateError::Upstream(err.to_string())
        });

        Admission { quota, result }
    }

    /// Admits one vote from `identity`. Counts against the same quota as
    /// searches.
    pub async fn vote(&self, identity: &str, coupon_id: u64, up: bool) -> Admission<()> {
        let quota = match self.throttle(identity).await {
            Ok(quota) => quota,
            Err(denied) => return denied,
        };

        let result = match self.manager.vote(coupon_id, up).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(GateError::NotFound(format!("Coupon {} not found", coupon_id))),
            Err(err) => {
                error!(identity, coupon_id, error = %err, "coupon vote failed");
                Err(GateError::Upstream(err.to_string()))
            }
        };

        Admission { quota, result }
    }

    /// Admits a request whose parameters could not be read at all. It is
    /// counted and throttled like any other request before `err` is reported.
    pub async fn reject(&self, identity: &str, err: GateError) -> Admission<Infallible> {
        let quota = match self.throttle(identity).await {
            Ok(quota) => quota,
            Err(denied) => return denied,
        };

        info!(identity, error = %err, "rejected malformed request");
        Admission {
            quota,
            result: Err(err),
        }
    }
}
