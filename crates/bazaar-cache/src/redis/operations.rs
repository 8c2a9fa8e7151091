//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::debug;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::{CacheProvider, WindowCount};

use super::client::RedisClient;

/// Increment and start the window on the first hit, in one round trip.
/// A key that somehow lost its expiry is given one again.
const INCR_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
  redis.call('PEXPIRE', KEYS[1], ARGV[1])
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
    incr_window: Script,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            incr_window: Script::new(INCR_WINDOW_SCRIPT),
        }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        conn.get(&full_key).await.map_err(Self::map_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let _: () = conn
            .pset_ex(&full_key, value, millis)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        conn.exists(&full_key).await.map_err(Self::map_err)
    }

    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<WindowCount> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1);

        let (count, ttl_ms): (u64, i64) = self
            .incr_window
            .key(&full_key)
            .arg(window_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(WindowCount {
            count,
            resets_in: Duration::from_millis(u64::try_from(ttl_ms).unwrap_or(0)),
        })
    }

    async fn window_counts(&self, prefix: &str) -> AppResult<Vec<(String, WindowCount)>> {
        let full_prefix = self.client.prefixed_key(prefix);
        let pattern = format!("{full_prefix}*");
        let mut conn = self.client.conn_mut();

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        let mut counts = Vec::with_capacity(keys.len());
        for full_key in keys {
            let (count, ttl_ms): (Option<u64>, i64) = redis::pipe()
                .get(&full_key)
                .pttl(&full_key)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;
            // Expired between SCAN and GET.
            let (Some(count), Ok(ttl_ms)) = (count, u64::try_from(ttl_ms)) else {
                continue;
            };
            let key = full_key
                .strip_prefix(&self.client.prefixed_key(""))
                .unwrap_or(&full_key)
                .to_string();
            counts.push((
                key,
                WindowCount {
                    count,
                    resets_in: Duration::from_millis(ttl_ms),
                },
            ));
        }
        Ok(counts)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }

    async fn flush_all(&self) -> AppResult<()> {
        // Only keys under our prefix, never the whole database.
        let pattern = self.client.prefixed_key("*");
        let mut conn = self.client.conn_mut();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if !keys.is_empty() {
            let _: () = conn.del(&keys).await.map_err(Self::map_err)?;
        }
        debug!(count = keys.len(), "Flushed prefixed keys");
        Ok(())
    }
}
