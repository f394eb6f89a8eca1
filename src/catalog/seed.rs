//! Generated demo coupons for the in-memory catalog.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{Coupon, DiscountType, StoreType};

const STORE_DOMAINS: &[&str] = &[
    "amazon.com",
    "walmart.com",
    "target.com",
    "bestbuy.com",
    "macys.com",
    "kohls.com",
    "nike.com",
    "newegg.com",
];

const CODE_FAMILIES: &[(&str, &[&str])] = &[
    ("SAVE", &["10OFF", "20OFF", "30OFF", "50OFF", "100OFF"]),
    ("EXTRA", &["5PCT", "10PCT", "15PCT", "20PCT", "25PCT"]),
    ("SEASON", &["SPRING", "SUMMER", "FALL", "WINTER"]),
    ("HOLIDAY", &["2024", "DEALS", "SPECIAL"]),
];

const CATEGORIES: &[&str] = &["Electronics", "Apparel", "Home", "Sports", "Grocery"];

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates `count` coupons with ids `1..=count`.
///
/// The same `seed` always yields the same catalog, relative to `now`.
pub fn generate_coupons(count: usize, seed: u64, now: DateTime<Utc>) -> Vec<Coupon> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count as u64)
        .map(|id| generate_coupon(&mut rng, id, now))
        .collect()
}

fn generate_coupon(rng: &mut StdRng, id: u64, now: DateTime<Utc>) -> Coupon {
    let (prefix, suffixes) = CODE_FAMILIES[rng.gen_range(0..CODE_FAMILIES.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];
    let infix: String = (0..4)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
        .collect();
    let code = format!("{}{}{}", prefix, infix, suffix);

    let domain = STORE_DOMAINS[rng.gen_range(0..STORE_DOMAINS.len())];
    let merchant_name = domain.trim_end_matches(".com").to_string();
    let slug: String = (0..6)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())].to_ascii_lowercase() as char)
        .collect();

    let (discount_type, discount_value, title) = if rng.gen_bool(0.5) {
        let pct = *[5, 10, 15, 20, 25, 30, 40, 50].choose(rng).unwrap_or(&10);
        (DiscountType::PercentageOff, pct as f64, format!("{}% off", pct))
    } else {
        let amount = *[5, 10, 15, 20, 25, 30, 50, 100].choose(rng).unwrap_or(&10);
        (DiscountType::FixedAmount, amount as f64, format!("${} off", amount))
    };

    let created_at = now - Duration::minutes(rng.gen_range(0..60 * 24 * 90));
    let up_votes = random_votes(rng, created_at, now, 50);
    let down_votes = random_votes(rng, created_at, now, 20);
    let score = up_votes.len() as f64 - down_votes.len() as f64;

    Coupon {
        id,
        created_at,
        code,
        title: format!("{} at {}", title, merchant_name),
        description: format!("Use this code at checkout on {}", domain),
        discount_value,
        discount_type,
        merchant_name,
        merchant_url: format!("https://www.{}/promotions/{}", domain, slug),
        start_date: Some(created_at),
        end_date: None,
        terms_conditions: None,
        minimum_purchase_amount: None,
        maximum_discount_amount: None,
        up_votes,
        down_votes,
        categories: Some(vec![CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string()]),
        tags: None,
        regions: None,
        store_type: Some(StoreType::Online),
        score,
    }
}

fn random_votes(
    rng: &mut StdRng,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    max_votes: usize,
) -> Vec<DateTime<Utc>> {
    let span_ms = (now - since).num_milliseconds().max(1);
    let mut votes: Vec<DateTime<Utc>> = (0..rng.gen_range(0..max_votes))
        .map(|_| since + Duration::milliseconds(rng.gen_range(0..span_ms)))
        .collect();
    votes.sort();
    votes
}
