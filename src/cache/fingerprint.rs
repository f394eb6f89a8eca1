//! Cache Fingerprint Module
//!
//! Deterministic cache keys for search requests.

use sha2::{Digest, Sha256};

use crate::catalog::{normalize_search, SearchParams};

/// Namespace shared by every search fingerprint.
pub const FINGERPRINT_PREFIX: &str = "coupons:search:";

/// Canonical text form of a search, fields in fixed alphabetical order.
///
/// The search text is re-normalized here so params built by hand still
/// collapse onto the same key.
pub fn canonical_query(params: &SearchParams) -> String {
    format!(
        "limit={}&offset={}&search={}&sort={}",
        params.limit,
        params.offset,
        normalize_search(&params.search),
        params.sort.token()
    )
}

/// Cache key for `params`: prefix plus the hex SHA-256 of the canonical form.
pub fn fingerprint(params: &SearchParams) -> String {
    let digest = Sha256::digest(canonical_query(params).as_bytes());
    format!("{}{:x}", FINGERPRINT_PREFIX, digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortMode;

    #[test]
    fn test_cosmetic_differences_share_fingerprint() {
        let a = SearchParams::new("save10", SortMode::Newest, 10, 0);
        let b = SearchParams::new("  SAVE10 ", SortMode::Newest, 10, 0);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_unnormalized_struct_still_matches() {
        let normalized = SearchParams::new("free shipping", SortMode::Oldest, 5, 5);
        let raw = SearchParams {
            search: "Free   Shipping".to_string(),
            ..normalized.clone()
        };
        assert_eq!(fingerprint(&normalized), fingerprint(&raw));
    }

    #[test]
    fn test_each_field_changes_fingerprint() {
        let base = SearchParams::new("save10", SortMode::Newest, 10, 0);
        let variants = [
            SearchParams::new("save20", SortMode::Newest, 10, 0),
            SearchParams::new("save10", SortMode::Oldest, 10, 0),
            SearchParams::new("save10", SortMode::Newest, 20, 0),
            SearchParams::new("save10", SortMode::Newest, 10, 10),
        ];

        for variant in &variants {
            assert_ne!(fingerprint(&base), fingerprint(variant), "{:?}", variant);
        }
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = fingerprint(&SearchParams::new("", SortMode::HighScore, 10, 0));
        assert!(fp.starts_with(FINGERPRINT_PREFIX));
        assert_eq!(fp.len(), FINGERPRINT_PREFIX.len() + 64);
        assert_eq!(
            canonical_query(&SearchParams::new("", SortMode::HighScore, 10, 0)),
            "limit=10&offset=0&search=&sort=high_score"
        );
    }
}
