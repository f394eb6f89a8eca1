//! API Routes
//!
//! Configures the Axum router with all gate endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    downvote_handler, health_handler, quota_handler, search_handler, stats_handler,
    upvote_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/coupons` - Rate-limited, cached coupon search
/// - `GET /api/quota` - Caller's remaining quota (not counted)
/// - `POST /api/coupons/:id/vote/up` - Upvote a coupon
/// - `POST /api/coupons/:id/vote/down` - Downvote a coupon
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/coupons", get(search_handler))
        .route("/api/quota", get(quota_handler))
        .route("/api/coupons/:id/vote/up", post(upvote_handler))
        .route("/api/coupons/:id/vote/down", post(downvote_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
