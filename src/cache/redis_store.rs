//! Redis-backed cache store, shared by every gate instance.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::StoreError;

/// Cache store holding pages as plain strings with a native Redis expiry.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Opens a multiplexed connection to `client`.
    pub async fn connect(client: &redis::Client) -> Result<Self, StoreError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, fingerprint: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(fingerprint).await?;
        debug!(fingerprint, hit = payload.is_some(), "redis cache lookup");
        Ok(payload)
    }

    async fn set(
        &self,
        fingerprint: &str,
        payload: String,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        // SET EX rejects 0; an already-expired page is simply not stored
        if ttl_secs == 0 {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(fingerprint, payload, ttl_secs).await?;
        Ok(())
    }
}
