//! Redis-backed window store, shared by every gate instance.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;

use crate::cache::current_timestamp_ms;
use crate::error::StoreError;
use crate::limiter::{WindowRecord, WindowStore, WindowTally};

/// Increment and expiry in one atomic step so a counter can never outlive
/// its window. Returns `{count, pttl}`.
const INCREMENT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Fixed-window counters stored as `rate_limit:{identity}` integers with a
/// native expiry.
#[derive(Clone)]
pub struct RedisWindowStore {
    conn: MultiplexedConnection,
    script: Script,
}

impl RedisWindowStore {
    /// Opens a multiplexed connection to `client`.
    pub async fn connect(client: &redis::Client) -> Result<Self, StoreError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            script: Script::new(INCREMENT_SCRIPT),
        })
    }
}

pub(crate) fn window_key(identity: &str) -> String {
    format!("rate_limit:{}", identity)
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn get(&self, key: &str) -> Result<Option<WindowRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let redis_key = window_key(key);

        let (count, ttl_ms): (Option<u64>, i64) = redis::pipe()
            .get(&redis_key)
            .pttl(&redis_key)
            .query_async(&mut conn)
            .await?;

        // Only the remaining TTL is stored; the window is rebuilt from it
        let record = match count {
            Some(count) if ttl_ms > 0 => {
                let ttl_ms = ttl_ms as u64;
                let window_secs = ttl_ms.div_ceil(1000);
                let window_end = current_timestamp_ms() + ttl_ms;
                Some(WindowRecord {
                    key: key.to_string(),
                    count,
                    window_start: window_end.saturating_sub(window_secs * 1000),
                    window_secs,
                })
            }
            _ => None,
        };
        Ok(record)
    }

    async fn increment_or_create(
        &self,
        key: &str,
        window_secs: u64,
    ) -> Result<WindowTally, StoreError> {
        let mut conn = self.conn.clone();
        let window_ms = window_secs.saturating_mul(1000).max(1);

        let (count, ttl_ms): (i64, i64) = self
            .script
            .key(window_key(key))
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await?;

        if count < 1 {
            return Err(StoreError::Corrupt(format!(
                "counter for {} returned {}",
                key, count
            )));
        }

        Ok(WindowTally {
            count: count as u64,
            ttl_remaining_ms: ttl_ms.max(0) as u64,
        })
    }
}
