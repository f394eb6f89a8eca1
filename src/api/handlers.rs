//! API Handlers
//!
//! HTTP request handlers for each gate endpoint, plus the translation of
//! admission outcomes into status codes and quota headers.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        ConnectInfo, Path, Query, State,
    },
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::cache::{
    current_timestamp_ms, CacheStore, MemoryCacheStore, Provenance, QueryCacheManager,
    RedisCacheStore, Resolved,
};
use crate::catalog::{generate_coupons, CouponSource, HttpCouponSource, InMemoryCatalog};
use crate::config::Config;
use crate::error::{GateError, StoreError};
use crate::limiter::{MemoryWindowStore, QuotaSnapshot, RateLimiter, RedisWindowStore, WindowStore};
use crate::models::{HealthResponse, QuotaResponse, SearchQuery, StatsResponse, VoteResponse};
use crate::pipeline::{client_identity, Admission, AdmissionPipeline, ParamBounds};
use crate::tasks::Sweep;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Seed for the generated in-memory catalog.
const CATALOG_SEED: u64 = 0x5eed;

/// Application state shared across all handlers.
///
/// Holds the process-wide admission state. It is empty at startup and needs
/// no teardown beyond process exit.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AdmissionPipeline,
    /// Derive identity from proxy headers
    pub trust_proxy_headers: bool,
    /// In-memory stores the background sweep should visit
    pub sweepers: Vec<Arc<dyn Sweep>>,
}

impl AppState {
    pub fn new(pipeline: AdmissionPipeline, trust_proxy_headers: bool) -> Self {
        Self {
            pipeline,
            trust_proxy_headers,
            sweepers: Vec::new(),
        }
    }

    /// Builds state with in-memory window and cache stores over `source`.
    pub fn in_memory(config: &Config, source: Arc<dyn CouponSource>) -> Self {
        let windows = Arc::new(MemoryWindowStore::new());
        let cache = Arc::new(MemoryCacheStore::new(config.cache_max_entries));

        let mut state = Self::assemble(config, windows.clone(), cache.clone(), source);
        state.sweepers = vec![windows as Arc<dyn Sweep>, cache as Arc<dyn Sweep>];
        state
    }

    /// Creates the AppState described by the configuration.
    ///
    /// With `REDIS_URL` both stores live in Redis and are shared across
    /// instances; otherwise they are process-local.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let source: Arc<dyn CouponSource> = match &config.coupon_source_url {
            Some(url) => {
                info!("Using remote coupon source at {}", url);
                Arc::new(HttpCouponSource::new(url.clone()))
            }
            None => {
                info!("Seeding in-memory catalog with {} coupons", config.seed_coupons);
                Arc::new(InMemoryCatalog::new(generate_coupons(
                    config.seed_coupons,
                    CATALOG_SEED,
                    chrono::Utc::now(),
                )))
            }
        };

        match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let windows = RedisWindowStore::connect(&client).await?;
                let cache = RedisCacheStore::connect(&client).await?;
                info!("Rate-limit windows and cached pages stored in Redis");
                Ok(Self::assemble(config, Arc::new(windows), Arc::new(cache), source))
            }
            None => Ok(Self::in_memory(config, source)),
        }
    }

    fn assemble(
        config: &Config,
        windows: Arc<dyn WindowStore>,
        cache: Arc<dyn CacheStore>,
        source: Arc<dyn CouponSource>,
    ) -> Self {
        let limiter = RateLimiter::new(windows, config.rate_limit_requests, config.rate_limit_window);
        let manager = QueryCacheManager::new(cache, source, config.cache_ttl);
        let pipeline = AdmissionPipeline::new(limiter, manager, ParamBounds::from_config(config));
        Self::new(pipeline, config.trust_proxy_headers)
    }

    fn identity(&self, headers: &HeaderMap, peer: Option<ConnectInfo<SocketAddr>>) -> String {
        client_identity(headers, peer.map(|ConnectInfo(addr)| addr), self.trust_proxy_headers)
    }
}

// == Response Assembly ==

fn apply_quota_headers(headers: &mut HeaderMap, quota: &QuotaSnapshot) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(quota.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(quota.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(quota.reset_epoch_secs()));
}

/// Turns an admission into a response. Quota headers are attached to every
/// outcome; throttled responses also get `Retry-After`.
fn respond<T>(admission: Admission<T>, ok: impl FnOnce(T) -> Response) -> Response {
    let Admission { quota, result } = admission;
    let throttled = matches!(result, Err(GateError::Throttled { .. }));

    let mut response = match result {
        Ok(value) => ok(value),
        Err(err) => err.into_response(),
    };

    let headers = response.headers_mut();
    apply_quota_headers(headers, &quota);
    if throttled {
        let retry_after = quota.retry_after_secs(current_timestamp_ms()).max(1);
        headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    }
    response
}

/// Reports an extractor rejection through the pipeline so it is counted and
/// carries quota headers like every other outcome.
async fn respond_rejected(state: &AppState, identity: &str, err: GateError) -> Response {
    let admission = state.pipeline.reject(identity, err).await;
    respond(admission, |never: Infallible| match never {})
}

/// Names the query key the rejection mentions, `query` when it names none.
fn query_rejection(rejection: &QueryRejection) -> GateError {
    let detail = rejection.body_text();
    let field = SearchQuery::FIELDS
        .into_iter()
        .find(|field| detail.contains(&format!("`{}`", field)))
        .unwrap_or("query");
    GateError::invalid(field, detail)
}

fn path_rejection(rejection: &PathRejection) -> GateError {
    GateError::invalid(
        "id",
        format!("must be a non-negative integer ({})", rejection.body_text()),
    )
}

fn search_response(resolved: Resolved) -> Response {
    let marker = match resolved.provenance {
        Provenance::Cache => "HIT",
        Provenance::Source => "MISS",
    };
    ([(X_CACHE, HeaderValue::from_static(marker))], Json(resolved.page)).into_response()
}

// == Handlers ==

/// Handler for GET /api/coupons
///
/// Rate-limited, cached coupon search.
pub async fn search_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let identity = state.identity(&headers, peer);
    match query.map_err(|rejection| query_rejection(&rejection)) {
        Ok(Query(query)) => {
            let admission = state.pipeline.admit(&identity, &query).await;
            respond(admission, search_response)
        }
        Err(err) => respond_rejected(&state, &identity, err).await,
    }
}

/// Handler for GET /api/quota
///
/// Reports the caller's quota without consuming any of it.
pub async fn quota_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Response {
    let identity = state.identity(&headers, peer);
    let quota = state.pipeline.limiter().peek(&identity).await;

    let mut response = Json(QuotaResponse::from(quota)).into_response();
    apply_quota_headers(response.headers_mut(), &quota);
    response
}

/// Handler for POST /api/coupons/:id/vote/up
pub async fn upvote_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> Response {
    vote(&state, peer, &headers, id, true).await
}

/// Handler for POST /api/coupons/:id/vote/down
pub async fn downvote_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> Response {
    vote(&state, peer, &headers, id, false).await
}

async fn vote(
    state: &AppState,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
    id: Result<Path<u64>, PathRejection>,
    up: bool,
) -> Response {
    let identity = state.identity(headers, peer);
    let coupon_id = match id.map_err(|rejection| path_rejection(&rejection)) {
        Ok(Path(coupon_id)) => coupon_id,
        Err(err) => return respond_rejected(state, &identity, err).await,
    };

    let admission = state.pipeline.vote(&identity, coupon_id, up).await;
    respond(admission, |()| {
        Json(VoteResponse::new(coupon_id, up)).into_response()
    })
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let manager = state.pipeline.manager();
    Json(StatsResponse::new(manager.stats(), manager.ttl_secs()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::coupon::sample_coupon;
    use axum::http::StatusCode;

    fn state(limit: u64) -> AppState {
        let config = Config {
            rate_limit_requests: limit,
            ..Config::default()
        };
        let source = Arc::new(InMemoryCatalog::new(vec![sample_coupon(1, "SAVE10OFF")]));
        AppState::in_memory(&config, source)
    }

    #[tokio::test]
    async fn test_search_handler_sets_headers() {
        let state = state(5);

        let response = search_handler(
            State(state.clone()),
            None,
            HeaderMap::new(),
            Ok(Query(SearchQuery::default())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[&X_RATELIMIT_LIMIT], "5");
        assert_eq!(response.headers()[&X_RATELIMIT_REMAINING], "4");
        assert_eq!(response.headers()[&X_CACHE], "MISS");
    }

    #[tokio::test]
    async fn test_throttled_response_has_retry_after() {
        let state = state(1);
        let call = || {
            search_handler(
                State(state.clone()),
                None,
                HeaderMap::new(),
                Ok(Query(SearchQuery::default())),
            )
        };

        assert_eq!(call().await.status(), StatusCode::OK);
        let response = call().await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
        assert_eq!(response.headers()[&X_RATELIMIT_REMAINING], "0");
    }

    #[tokio::test]
    async fn test_in_memory_state_registers_sweepers() {
        assert_eq!(state(5).sweepers.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(state(5))).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert!(response.local);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
