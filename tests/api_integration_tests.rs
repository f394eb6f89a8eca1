//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle through the router, including
//! quota headers and cache provenance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use coupon_gate::{
    api::create_router,
    catalog::{Coupon, CouponPage, CouponSource, DiscountType, InMemoryCatalog, SearchParams},
    error::SourceError,
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn coupon(id: u64, code: &str, age_days: i64) -> Coupon {
    Coupon {
        id,
        created_at: Utc::now() - Duration::days(age_days),
        code: code.to_string(),
        title: format!("{} at checkout", code),
        description: "Seasonal promotion".to_string(),
        discount_value: 10.0,
        discount_type: DiscountType::PercentageOff,
        merchant_name: "Northwind".to_string(),
        merchant_url: "https://northwind.example.com".to_string(),
        start_date: None,
        end_date: None,
        terms_conditions: None,
        minimum_purchase_amount: None,
        maximum_discount_amount: None,
        up_votes: Vec::new(),
        down_votes: Vec::new(),
        categories: None,
        tags: None,
        regions: None,
        store_type: None,
        score: 0.0,
    }
}

fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::new(vec![
        coupon(1, "SAVE10NOW", 3),
        coupon(2, "SAVE10TODAY", 1),
        coupon(3, "FREESHIP", 0),
        coupon(4, "save10-extra", 2),
    ]))
}

fn test_config(limit: u64) -> Config {
    Config {
        rate_limit_requests: limit,
        rate_limit_window: 60,
        trust_proxy_headers: true,
        ..Config::default()
    }
}

fn create_test_app(limit: u64, source: Arc<dyn CouponSource>) -> Router {
    create_router(AppState::in_memory(&test_config(limit), source))
}

async fn send(app: &Router, method: &str, uri: &str, client: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

/// Source that always fails and counts how often it was asked.
struct FailingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl CouponSource for FailingSource {
    async fn query(&self, _params: &SearchParams) -> Result<CouponPage, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Unavailable("connection refused by db-primary:5432".to_string()))
    }

    async fn vote(&self, _coupon_id: u64, _up: bool) -> Result<bool, SourceError> {
        Err(SourceError::Status(503))
    }
}

// == Search Endpoint Tests ==

#[tokio::test]
async fn test_search_miss_then_hit() {
    let app = create_test_app(10, catalog());
    let uri = "/api/coupons?search=save10&sort=newest&limit=10&offset=0";

    let first = send(&app, "GET", uri, "203.0.113.5").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-cache"), "MISS");
    assert_eq!(header(&first, "x-ratelimit-limit"), "10");
    assert_eq!(header(&first, "x-ratelimit-remaining"), "9");
    let first_body = body_to_json(first.into_body()).await;

    let second = send(&app, "GET", uri, "203.0.113.5").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-cache"), "HIT");
    assert_eq!(header(&second, "x-ratelimit-remaining"), "8");
    assert_eq!(body_to_json(second.into_body()).await, first_body);
}

#[tokio::test]
async fn test_search_filters_sorts_and_paginates() {
    let app = create_test_app(10, catalog());

    let response = send(
        &app,
        "GET",
        "/api/coupons?search=%20SAVE10%20&sort=newest&limit=2&offset=0",
        "203.0.113.5",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["offset"], 0);
    let ids: Vec<u64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test]
async fn test_cosmetic_variants_share_cache_entry() {
    let app = create_test_app(10, catalog());

    let first = send(&app, "GET", "/api/coupons?search=save10&sort=newest", "203.0.113.5").await;
    assert_eq!(header(&first, "x-cache"), "MISS");

    let second = send(&app, "GET", "/api/coupons?search=%20%20SAVE10&sort=newest", "203.0.113.5").await;
    assert_eq!(header(&second, "x-cache"), "HIT");
}

#[tokio::test]
async fn test_search_throttled_after_limit() {
    let app = create_test_app(3, catalog());

    for expected_remaining in ["2", "1", "0"] {
        let response = send(&app, "GET", "/api/coupons", "198.51.100.7").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "x-ratelimit-remaining"), expected_remaining);
    }

    let denied = send(&app, "GET", "/api/coupons", "198.51.100.7").await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&denied, "x-ratelimit-remaining"), "0");
    let retry_after: u64 = header(&denied, "retry-after").parse().unwrap();
    assert!((1..=60).contains(&retry_after));

    let json = body_to_json(denied.into_body()).await;
    assert_eq!(json["error"], "Rate limit exceeded");

    // Other clients keep their own quota
    let other = send(&app, "GET", "/api/coupons", "198.51.100.8").await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_params_name_the_field() {
    let app = create_test_app(10, catalog());

    let cases = [
        ("/api/coupons?limit=0", "limit"),
        ("/api/coupons?limit=500", "limit"),
        ("/api/coupons?limit=abc", "limit"),
        ("/api/coupons?offset=-1", "offset"),
        ("/api/coupons?sort=popular", "sort"),
    ];

    for (uri, field) in cases {
        let response = send(&app, "GET", uri, "192.0.2.10").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(response.headers().contains_key("x-ratelimit-remaining"));

        let json = body_to_json(response.into_body()).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.contains(field), "{} -> {}", uri, message);
    }
}

#[tokio::test]
async fn test_unparseable_query_is_counted_and_throttled() {
    let app = create_test_app(1, catalog());
    let uri = "/api/coupons?limit=5&limit=6";

    let first = send(&app, "GET", uri, "192.0.2.11").await;
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&first, "x-ratelimit-limit"), "1");
    assert_eq!(header(&first, "x-ratelimit-remaining"), "0");
    let json = body_to_json(first.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid limit"));

    for _ in 0..2 {
        let denied = send(&app, "GET", uri, "192.0.2.11").await;
        assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(denied.headers().contains_key("retry-after"));
    }
}

#[tokio::test]
async fn test_non_numeric_vote_id_is_counted() {
    let app = create_test_app(1, catalog());

    let first = send(&app, "POST", "/api/coupons/abc/vote/up", "192.0.2.12").await;
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&first, "x-ratelimit-remaining"), "0");
    let json = body_to_json(first.into_body()).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid id"));

    let second = send(&app, "POST", "/api/coupons/abc/vote/down", "192.0.2.12").await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_overlong_search_rejected() {
    let app = create_test_app(10, catalog());
    let uri = format!("/api/coupons?search={}", "a".repeat(101));

    let response = send(&app, "GET", &uri, "192.0.2.10").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("search"));
}

#[tokio::test]
async fn test_source_failure_is_generic_500() {
    let source = Arc::new(FailingSource {
        calls: AtomicUsize::new(0),
    });
    let app = create_test_app(10, source.clone());

    let response = send(&app, "GET", "/api/coupons?search=save10", "192.0.2.20").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "9");

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Failed to fetch coupons");
    assert!(!json.to_string().contains("db-primary"));

    // Failures are never cached
    send(&app, "GET", "/api/coupons?search=save10", "192.0.2.20").await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

// == Quota Endpoint Tests ==

#[tokio::test]
async fn test_quota_does_not_consume() {
    let app = create_test_app(5, catalog());

    send(&app, "GET", "/api/coupons", "192.0.2.30").await;

    for _ in 0..3 {
        let response = send(&app, "GET", "/api/quota", "192.0.2.30").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["limit"], 5);
        assert_eq!(json["remaining"], 4);
    }
}

#[tokio::test]
async fn test_quota_for_new_client_is_full() {
    let app = create_test_app(5, catalog());

    let response = send(&app, "GET", "/api/quota", "192.0.2.31").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["remaining"], 5);
}

// == Vote Endpoint Tests ==

#[tokio::test]
async fn test_vote_changes_ordering() {
    let app = create_test_app(10, catalog());

    let response = send(&app, "POST", "/api/coupons/3/vote/up", "192.0.2.40").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-ratelimit-remaining"), "9");
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["coupon_id"], 3);

    let page = send(&app, "GET", "/api/coupons?sort=high_score&limit=1", "192.0.2.40").await;
    let json = body_to_json(page.into_body()).await;
    assert_eq!(json["data"][0]["id"], 3);
}

#[tokio::test]
async fn test_vote_unknown_coupon_is_404() {
    let app = create_test_app(10, catalog());

    let response = send(&app, "POST", "/api/coupons/999/vote/down", "192.0.2.41").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_votes_count_against_quota() {
    let app = create_test_app(1, catalog());

    let first = send(&app, "POST", "/api/coupons/1/vote/up", "192.0.2.42").await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(&app, "GET", "/api/coupons", "192.0.2.42").await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

// == Stats & Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_reflect_lookups() {
    let app = create_test_app(10, catalog());

    send(&app, "GET", "/api/coupons?search=free", "192.0.2.50").await;
    send(&app, "GET", "/api/coupons?search=free", "192.0.2.50").await;

    let response = send(&app, "GET", "/stats", "192.0.2.50").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["ttl_secs"], 60);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(10, catalog());

    let response = send(&app, "GET", "/health", "192.0.2.60").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = create_test_app(10, catalog());

    let response = send(&app, "GET", "/api/unknown", "192.0.2.60").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
