//! Backing collections: the source of truth behind the search cache.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::{select_page, Coupon, CouponPage, SearchParams};
use crate::error::SourceError;

// == Coupon Source Contract ==
/// A searchable coupon collection.
#[async_trait]
pub trait CouponSource: Send + Sync {
    /// Returns one ordered page of matches plus the total match count.
    async fn query(&self, params: &SearchParams) -> Result<CouponPage, SourceError>;

    /// Records an up or down vote. Returns `Ok(false)` for an unknown id.
    async fn vote(&self, coupon_id: u64, up: bool) -> Result<bool, SourceError>;
}

// == In-Memory Catalog ==
/// Process-local collection searched by linear scan.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    coupons: RwLock<Vec<Coupon>>,
}

impl InMemoryCatalog {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: RwLock::new(coupons),
        }
    }
}

#[async_trait]
impl CouponSource for InMemoryCatalog {
    async fn query(&self, params: &SearchParams) -> Result<CouponPage, SourceError> {
        let coupons = self.coupons.read().await;
        Ok(select_page(&coupons, params))
    }

    async fn vote(&self, coupon_id: u64, up: bool) -> Result<bool, SourceError> {
        let mut coupons = self.coupons.write().await;
        match coupons.iter_mut().find(|coupon| coupon.id == coupon_id) {
            Some(coupon) => {
                coupon.record_vote(up, Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// == Remote Catalog ==
/// Coupon search API reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCouponSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RemotePage {
    #[serde(default)]
    data: Option<Vec<Coupon>>,
    #[serde(default)]
    total: usize,
}

impl HttpCouponSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CouponSource for HttpCouponSource {
    async fn query(&self, params: &SearchParams) -> Result<CouponPage, SourceError> {
        let url = format!("{}/coupons/search", self.base_url);
        let limit = params.limit.to_string();
        let offset = params.offset.to_string();
        debug!(%url, search = %params.search, sort = %params.sort, "querying remote coupon source");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", params.search.as_str()),
                ("sort_by", params.sort.token()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let page: RemotePage = response.json().await?;
        Ok(CouponPage {
            data: page.data.unwrap_or_default(),
            total: page.total,
            limit: params.limit,
            offset: params.offset,
        })
    }

    async fn vote(&self, coupon_id: u64, up: bool) -> Result<bool, SourceError> {
        let direction = if up { "up" } else { "down" };
        let url = format!("{}/coupons/vote/{}/{}", self.base_url, direction, coupon_id);

        let response = self.client.post(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(SourceError::Status(status.as_u16())),
        }
    }
}
