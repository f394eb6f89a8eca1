//! Catalog Module
//!
//! The coupon collection that sits behind the search cache: entity model,
//! sort modes, page selection and the backing source implementations.

pub mod coupon;
mod query;
mod seed;
mod source;

pub use coupon::{Coupon, CouponPage, DiscountType, StoreType};
pub use query::{normalize_search, select_page, SearchParams, SortMode};
pub use seed::generate_coupons;
pub use source::{CouponSource, HttpCouponSource, InMemoryCatalog};
