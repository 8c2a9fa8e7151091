//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// State of a fixed-window counter after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Hits recorded in the current window, including this one.
    pub count: u64,
    /// Time until the window closes and the counter resets.
    pub resets_in: Duration,
}

/// Trait for cache backends (Redis or in-memory).
///
/// Besides plain key/value storage this is the shared counter store used
/// for rate limiting, login lockout, and the access-token denylist. The
/// provider is responsible for key prefixing and TTL enforcement.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Atomically increment a fixed-window counter.
    ///
    /// The first hit creates the counter and starts a window of length
    /// `window`; later hits in the same window only increment. Concurrent
    /// callers across processes never observe the same count.
    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<WindowCount>;

    /// Open fixed-window counters whose key starts with `prefix`, without
    /// incrementing them. Order is unspecified.
    async fn window_counts(&self, prefix: &str) -> AppResult<Vec<(String, WindowCount)>>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Flush all entries from the cache.
    async fn flush_all(&self) -> AppResult<()>;
}
