//! API Module
//!
//! HTTP handlers and routing for the coupon gate REST API.
//!
//! # Endpoints
//! - `GET /api/coupons` - Search coupons (rate-limited, cached)
//! - `GET /api/quota` - Inspect the caller's quota
//! - `POST /api/coupons/:id/vote/{up,down}` - Vote on a coupon (rate-limited)
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
