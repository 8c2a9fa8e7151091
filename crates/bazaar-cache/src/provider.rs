//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use bazaar_core::config::cache::CacheConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::{CacheProvider, WindowCount};

/// Cache manager that wraps the configured cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
    provider_name: &'static str,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let (inner, provider_name): (Arc<dyn CacheProvider>, &'static str) =
            match config.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!("Initializing Redis cache provider");
                    let client = crate::redis::RedisClient::connect(&config.redis).await?;
                    (Arc::new(crate::redis::RedisCacheProvider::new(client)), "redis")
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory cache provider");
                    (
                        Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory)),
                        "memory",
                    )
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown cache provider: '{other}'. Supported: memory, redis"
                    )));
                }
            };

        Ok(Self {
            inner,
            provider_name,
        })
    }

    /// A fresh in-memory cache (for tests and the CLI).
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        let config = bazaar_core::config::cache::MemoryCacheConfig::default();
        Self {
            inner: Arc::new(crate::memory::MemoryCacheProvider::new(&config)),
            provider_name: "memory",
        }
    }

    /// Name of the active provider.
    pub fn provider_type(&self) -> &'static str {
        self.provider_name
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<WindowCount> {
        self.inner.incr_window(key, window).await
    }

    async fn window_counts(&self, prefix: &str) -> AppResult<Vec<(String, WindowCount)>> {
        self.inner.window_counts(prefix).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.inner.flush_all().await
    }
}
