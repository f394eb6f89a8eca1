//! Request DTOs for the gate API
//!
//! Defines the raw shape of incoming query strings. Values stay strings so
//! validation can name the offending field instead of failing extraction.

use serde::Deserialize;

/// Query string of `GET /api/coupons`.
///
/// # Fields
/// - `search`: free text matched against code, title, description, merchant
/// - `sort`: one of `newest`, `oldest`, `high_score`, `low_score`
/// - `limit`: page size
/// - `offset`: number of matches to skip
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

impl SearchQuery {
    /// Query keys this endpoint understands.
    pub const FIELDS: [&'static str; 4] = ["search", "sort", "limit", "offset"];

    /// Convenience constructor used by tests and embedders.
    pub fn new(search: &str, sort: &str, limit: &str, offset: &str) -> Self {
        Self {
            search: Some(search.to_string()),
            sort: Some(sort.to_string()),
            limit: Some(limit.to_string()),
            offset: Some(offset.to_string()),
        }
    }
}
