//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: drops expired rate-limit windows and cached pages

mod cleanup;

pub use cleanup::{spawn_sweep_task, Sweep};
