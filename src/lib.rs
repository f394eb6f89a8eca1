//! Coupon Gate - rate-limited, cached coupon search
//!
//! Admits search requests through a per-client fixed-window limiter, then
//! answers them from a read-through page cache in front of a coupon source.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod pipeline;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::GateError;
pub use tasks::spawn_sweep_task;
