//! Pipeline Module
//!
//! Admission control for the coupon endpoints: caller identity, parameter
//! validation and the admission state machine.

mod admission;
mod identity;
mod params;

pub use admission::{Admission, AdmissionPipeline};
pub use identity::{client_identity, UNKNOWN_IDENTITY};
pub use params::ParamBounds;
