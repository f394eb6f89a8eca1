//! Validated search parameters, sort modes and the linear-scan page
//! selection shared by in-process collections.

use std::cmp::Ordering;
use std::fmt;

use crate::catalog::{Coupon, CouponPage};

// == Sort Mode ==
/// Closed set of orderings the search endpoint understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    Newest = 0,
    Oldest = 1,
    #[default]
    HighScore = 2,
    LowScore = 3,
}

type Comparator = fn(&Coupon, &Coupon) -> Ordering;

/// Indexed by `SortMode as usize`.
const COMPARATORS: [Comparator; 4] = [by_newest, by_oldest, by_high_score, by_low_score];

/// Indexed by `SortMode as usize`.
const TOKENS: [&str; 4] = ["newest", "oldest", "high_score", "low_score"];

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::HighScore,
        SortMode::LowScore,
    ];

    /// Wire token, e.g. `high_score`.
    pub fn token(self) -> &'static str {
        TOKENS[self as usize]
    }

    /// Looks up a mode by its wire token (exact match).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.token() == token)
    }

    pub fn comparator(self) -> Comparator {
        COMPARATORS[self as usize]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// Ties fall back to id so pages are stable across calls.
fn by_newest(a: &Coupon, b: &Coupon) -> Ordering {
    b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))
}

fn by_oldest(a: &Coupon, b: &Coupon) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

fn by_high_score(a: &Coupon, b: &Coupon) -> Ordering {
    b.score.total_cmp(&a.score).then(a.id.cmp(&b.id))
}

fn by_low_score(a: &Coupon, b: &Coupon) -> Ordering {
    a.score.total_cmp(&b.score).then(a.id.cmp(&b.id))
}

// == Search Params ==
/// Validated, normalized search request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Trimmed, lowercased, whitespace-collapsed search text
    pub search: String,
    pub sort: SortMode,
    pub limit: u32,
    pub offset: u32,
}

impl SearchParams {
    /// Builds params, normalizing the search text.
    pub fn new(search: &str, sort: SortMode, limit: u32, offset: u32) -> Self {
        Self {
            search: normalize_search(search),
            sort,
            limit,
            offset,
        }
    }
}

/// Trims, lowercases and collapses whitespace runs to a single space.
pub fn normalize_search(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filters, orders and slices `coupons` for one page.
pub fn select_page(coupons: &[Coupon], params: &SearchParams) -> CouponPage {
    let mut matched: Vec<&Coupon> = coupons
        .iter()
        .filter(|coupon| coupon.matches(&params.search))
        .collect();
    let compare = params.sort.comparator();
    matched.sort_by(|a, b| compare(a, b));

    let total = matched.len();
    let data = matched
        .into_iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .cloned()
        .collect();

    CouponPage {
        data,
        total,
        limit: params.limit,
        offset: params.offset,
    }
}
