//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Requests admitted per identity per window
    pub rate_limit_requests: u64,
    /// Fixed window length in seconds
    pub rate_limit_window: u64,
    /// Lifetime of cached search pages in seconds
    pub cache_ttl: u64,
    /// Upper bound on in-memory cached pages, 0 = unbounded
    pub cache_max_entries: usize,
    /// Background sweep interval in seconds, 0 = lazy expiry only
    pub sweep_interval: u64,
    /// Maximum accepted search text length in characters
    pub max_search_length: usize,
    /// Largest accepted page size
    pub max_page_size: u32,
    /// Page size used when the caller omits `limit`
    pub default_page_size: u32,
    /// Shared store for windows and cached pages; in-memory when unset
    pub redis_url: Option<String>,
    /// Remote coupon API base URL; seeded in-memory catalog when unset
    pub coupon_source_url: Option<String>,
    /// Derive identity from X-Real-IP / X-Forwarded-For
    pub trust_proxy_headers: bool,
    /// Number of generated coupons for the in-memory catalog
    pub seed_coupons: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RATE_LIMIT_REQUESTS` - Requests per window (default: 180)
    /// - `RATE_LIMIT_WINDOW` - Window length in seconds (default: 900)
    /// - `CACHE_TTL` - Cached page lifetime in seconds (default: 60)
    /// - `CACHE_MAX_ENTRIES` - In-memory page bound (default: 1000)
    /// - `SWEEP_INTERVAL` - Expired state sweep in seconds (default: 60)
    /// - `MAX_SEARCH_LENGTH` - Search text limit (default: 100)
    /// - `MAX_PAGE_SIZE` - Largest `limit` (default: 100)
    /// - `DEFAULT_PAGE_SIZE` - Default `limit` (default: 10)
    /// - `REDIS_URL` - Shared store URL (default: unset)
    /// - `COUPON_SOURCE_URL` - Remote coupon API (default: unset)
    /// - `TRUST_PROXY_HEADERS` - `true`/`1` to honor proxy headers (default: false)
    /// - `SEED_COUPONS` - Generated catalog size (default: 200)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |name: &str| lookup(name).map(|v| v.trim().to_string());
        let defaults = Self::default();
        Self {
            server_port: parse_var(parse("SERVER_PORT")).unwrap_or(defaults.server_port),
            rate_limit_requests: parse_var::<u64>(parse("RATE_LIMIT_REQUESTS"))
                .filter(|v| *v > 0)
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_window: parse_var::<u64>(parse("RATE_LIMIT_WINDOW"))
                .filter(|v| *v > 0)
                .unwrap_or(defaults.rate_limit_window),
            cache_ttl: parse_var(parse("CACHE_TTL")).unwrap_or(defaults.cache_ttl),
            cache_max_entries: parse_var(parse("CACHE_MAX_ENTRIES"))
                .unwrap_or(defaults.cache_max_entries),
            sweep_interval: parse_var(parse("SWEEP_INTERVAL")).unwrap_or(defaults.sweep_interval),
            max_search_length: parse_var(parse("MAX_SEARCH_LENGTH"))
                .unwrap_or(defaults.max_search_length),
            max_page_size: parse_var::<u32>(parse("MAX_PAGE_SIZE"))
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_page_size),
            default_page_size: parse_var::<u32>(parse("DEFAULT_PAGE_SIZE"))
                .filter(|v| *v > 0)
                .unwrap_or(defaults.default_page_size),
            redis_url: non_empty(parse("REDIS_URL")),
            coupon_source_url: non_empty(parse("COUPON_SOURCE_URL")),
            trust_proxy_headers: non_empty(parse("TRUST_PROXY_HEADERS"))
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.trust_proxy_headers),
            seed_coupons: parse_var(parse("SEED_COUPONS")).unwrap_or(defaults.seed_coupons),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            rate_limit_requests: 180,
            rate_limit_window: 15 * 60,
            cache_ttl: 60,
            cache_max_entries: 1000,
            sweep_interval: 60,
            max_search_length: 100,
            max_page_size: 100,
            default_page_size: 10,
            redis_url: None,
            coupon_source_url: None,
            trust_proxy_headers: false,
            seed_coupons: 200,
        }
    }
}

fn parse_var<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
