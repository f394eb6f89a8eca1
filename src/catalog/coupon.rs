//! Coupon entity and the paginated result set returned by searches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a coupon discounts the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    PercentageOff,
    FixedAmount,
    Bogo,
    FreeShipping,
}

/// Where a coupon can be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    Online,
    InStore,
    Both,
}

/// A single discount code as stored by the backing collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub code: String,
    pub title: String,
    pub description: String,
    pub discount_value: f64,
    pub discount_type: DiscountType,
    pub merchant_name: String,
    pub merchant_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_purchase_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_discount_amount: Option<f64>,

    #[serde(default)]
    pub up_votes: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub down_votes: Vec<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_type: Option<StoreType>,

    #[serde(default)]
    pub score: f64,
}

impl Coupon {
    /// Case-insensitive containment test against the searchable text fields.
    ///
    /// `needle` must already be normalized (trimmed, lowercased); an empty
    /// needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        let contains = |text: &str| text.to_lowercase().contains(needle);
        let any_contains = |list: &Option<Vec<String>>| {
            list.iter().flatten().any(|item| contains(item.as_str()))
        };

        contains(self.code.as_str())
            || contains(self.title.as_str())
            || contains(self.description.as_str())
            || contains(self.merchant_name.as_str())
            || any_contains(&self.categories)
            || any_contains(&self.tags)
    }

    /// Records a vote at `at` and recomputes the score.
    pub fn record_vote(&mut self, up: bool, at: DateTime<Utc>) {
        if up {
            self.up_votes.push(at);
        } else {
            self.down_votes.push(at);
        }
        self.score = self.up_votes.len() as f64 - self.down_votes.len() as f64;
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponPage {
    pub data: Vec<Coupon>,
    /// Matches across all pages
    pub total: usize,
    pub limit: u32,
    pub offset: u32,
}

#[cfg(test)]
pub(crate) fn sample_coupon(id: u64, code: &str) -> Coupon {
    Coupon {
        id,
        created_at: Utc::now(),
        code: code.to_string(),
        title: format!("{} deal", code),
        description: "Limited time offer".to_string(),
        discount_value: 10.0,
        discount_type: DiscountType::PercentageOff,
        merchant_name: "Example Store".to_string(),
        merchant_url: "https://www.example.com/promotions".to_string(),
        start_date: None,
        end_date: None,
        terms_conditions: None,
        minimum_purchase_amount: None,
        maximum_discount_amount: None,
        up_votes: Vec::new(),
        down_votes: Vec::new(),
        categories: None,
        tags: Some(vec!["Electronics".to_string()]),
        regions: None,
        store_type: Some(StoreType::Online),
        score: 0.0,
    }
}
