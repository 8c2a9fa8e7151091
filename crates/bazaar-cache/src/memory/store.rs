//! In-memory cache implementation using moka and dashmap.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use tokio::time::Instant;
use tracing::debug;

use bazaar_core::config::cache::MemoryCacheConfig;
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::{CacheProvider, WindowCount};

use crate::keys;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    ends_at: Instant,
}

/// Size at which a map is next swept for expired entries.
///
/// After a sweep the threshold moves to twice the surviving size, so a map
/// full of live entries is not rescanned on every insert.
#[derive(Debug)]
struct SweepThreshold {
    next: AtomicUsize,
    floor: usize,
}

impl SweepThreshold {
    fn new(floor: usize) -> Self {
        Self {
            next: AtomicUsize::new(floor),
            floor,
        }
    }

    fn due(&self, len: usize) -> bool {
        len >= self.next.load(Ordering::Relaxed)
    }

    fn rearm(&self, remaining: usize) {
        self.next
            .store(remaining.saturating_mul(2).max(self.floor), Ordering::Relaxed);
    }
}

/// In-memory cache provider.
///
/// Ordinary values live in a moka cache bounded by `max_capacity`; each
/// entry also carries its own deadline, checked on read. Security state
/// ([`keys::is_pinned`]) is kept apart in a map that only ever drops
/// expired entries, so capacity pressure cannot evict a denylist entry or
/// a lockout. Window counters live in a `DashMap` whose entry lock makes
/// increment-or-start atomic.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
    pinned: Arc<DashMap<String, Entry>>,
    windows: Arc<DashMap<String, Window>>,
    pinned_sweep: Arc<SweepThreshold>,
    window_sweep: Arc<SweepThreshold>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .build();
        let floor = usize::try_from(config.max_capacity)
            .unwrap_or(usize::MAX)
            .max(1);

        Self {
            cache,
            pinned: Arc::new(DashMap::new()),
            windows: Arc::new(DashMap::new()),
            pinned_sweep: Arc::new(SweepThreshold::new(floor)),
            window_sweep: Arc::new(SweepThreshold::new(floor)),
        }
    }

    fn purge_expired_pinned(&self, now: Instant) {
        let before = self.pinned.len();
        self.pinned.retain(|_, e| e.expires_at > now);
        let remaining = self.pinned.len();
        self.pinned_sweep.rearm(remaining);
        debug!(removed = before - remaining, remaining, "Purged expired pinned entries");
    }

    fn purge_closed_windows(&self, now: Instant) {
        let before = self.windows.len();
        self.windows.retain(|_, w| w.ends_at > now);
        let remaining = self.windows.len();
        self.window_sweep.rearm(remaining);
        debug!(removed = before - remaining, remaining, "Purged closed rate windows");
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        if keys::is_pinned(key) {
            let live = self
                .pinned
                .get(key)
                .map(|e| (e.expires_at > now).then(|| e.value.clone()));
            return Ok(match live {
                Some(Some(value)) => Some(value),
                Some(None) => {
                    self.pinned.remove_if(key, |_, e| e.expires_at <= now);
                    None
                }
                None => None,
            });
        }

        match self.cache.get(key).await {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value)),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + ttl,
        };
        if keys::is_pinned(key) {
            if self.pinned_sweep.due(self.pinned.len()) {
                self.purge_expired_pinned(now);
            }
            self.pinned.insert(key.to_string(), entry);
        } else {
            self.cache.insert(key.to_string(), entry).await;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        self.pinned.remove(key);
        self.windows.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> AppResult<WindowCount> {
        let now = Instant::now();
        if self.window_sweep.due(self.windows.len()) {
            self.purge_closed_windows(now);
        }

        let mut slot = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            ends_at: now + window,
        });
        if slot.ends_at <= now {
            *slot = Window {
                count: 0,
                ends_at: now + window,
            };
        }
        slot.count += 1;

        Ok(WindowCount {
            count: slot.count,
            resets_in: slot.ends_at.saturating_duration_since(now),
        })
    }

    async fn window_counts(&self, prefix: &str) -> AppResult<Vec<(String, WindowCount)>> {
        let now = Instant::now();
        Ok(self
            .windows
            .iter()
            .filter(|w| w.key().starts_with(prefix) && w.ends_at > now)
            .map(|w| {
                (
                    w.key().clone(),
                    WindowCount {
                        count: w.count,
                        resets_in: w.ends_at.saturating_duration_since(now),
                    },
                )
            })
            .collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        self.pinned.clear();
        self.windows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        let config = MemoryCacheConfig {
            max_capacity: 1000,
            time_to_live_seconds: 3600,
        };
        MemoryCacheProvider::new(&config)
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(provider.get("key1").await.unwrap(), Some("value1".to_string()));
        assert!(provider.exists("key1").await.unwrap());

        provider.delete("key1").await.unwrap();
        assert_eq!(provider.get("key1").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_ttl_is_per_key() {
        let provider = make_provider();
        provider.set("short", "a", Duration::from_secs(5)).await.unwrap();
        provider.set("long", "b", Duration::from_secs(50)).await.unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!provider.exists("short").await.unwrap());
        assert!(provider.exists("long").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_counts_then_resets() {
        let provider = make_provider();
        let window = Duration::from_secs(60);

        let first = provider.incr_window("w", window).await.unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(first.resets_in, window);

        tokio::time::advance(Duration::from_secs(20)).await;
        let second = provider.incr_window("w", window).await.unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.resets_in, Duration::from_secs(40));

        tokio::time::advance(Duration::from_secs(40)).await;
        let fresh = provider.incr_window("w", window).await.unwrap();
        assert_eq!(fresh.count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_distinct() {
        let provider = make_provider();
        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    provider
                        .incr_window("shared", Duration::from_secs(60))
                        .await
                        .unwrap()
                        .count
                })
            })
            .collect();

        let mut counts: Vec<u64> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_health_check() {
        assert!(make_provider().health_check().await.unwrap());
    }

    fn small_provider(capacity: u64) -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig {
            max_capacity: capacity,
            time_to_live_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn test_security_state_survives_capacity_pressure() {
        let provider = small_provider(8);
        let denied = keys::token_denylist(uuid::Uuid::new_v4());
        let locked = keys::lockout("a@x.com");
        provider.set(&denied, "revoked", Duration::from_secs(600)).await.unwrap();
        provider.set(&locked, "1", Duration::from_secs(600)).await.unwrap();

        for i in 0..500 {
            provider
                .set(&format!("product:{i}"), "x", Duration::from_secs(600))
                .await
                .unwrap();
        }
        provider.cache.run_pending_tasks().await;

        assert!(provider.cache.entry_count() <= 8);
        assert!(provider.exists(&denied).await.unwrap());
        assert!(provider.exists(&locked).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pinned_entries_expire_and_are_purged() {
        let provider = small_provider(4);
        for i in 0..4 {
            provider
                .set(&keys::lockout(&format!("{i}@x.com")), "1", Duration::from_secs(5))
                .await
                .unwrap();
        }
        tokio::time::advance(Duration::from_secs(6)).await;

        provider
            .set(&keys::lockout("new@x.com"), "1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(provider.pinned.len(), 1);
        assert!(!provider.exists(&keys::lockout("0@x.com")).await.unwrap());
        assert!(provider.exists(&keys::lockout("new@x.com")).await.unwrap());
    }

    #[tokio::test]
    async fn test_window_purge_is_amortized() {
        let provider = small_provider(4);
        let window = Duration::from_secs(60);
        for i in 0..4 {
            provider.incr_window(&format!("rate:api:{i}"), window).await.unwrap();
        }
        assert!(provider.window_sweep.due(provider.windows.len()));

        // Every window is still open: the sweep keeps them all and backs off.
        provider.incr_window("rate:api:4", window).await.unwrap();
        assert_eq!(provider.windows.len(), 5);
        assert!(!provider.window_sweep.due(provider.windows.len()));
        assert_eq!(provider.window_sweep.next.load(Ordering::Relaxed), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_counts_lists_open_windows_by_prefix() {
        let provider = make_provider();
        provider.incr_window("rate:login:a", Duration::from_secs(60)).await.unwrap();
        provider.incr_window("rate:login:a", Duration::from_secs(60)).await.unwrap();
        provider.incr_window("rate:api:a", Duration::from_secs(10)).await.unwrap();
        provider.incr_window("rate:api:b", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(20)).await;
        let mut counts = provider.window_counts("rate:").await.unwrap();
        counts.sort_by(|a, b| a.0.cmp(&b.0));

        let keys: Vec<&str> = counts.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["rate:api:b", "rate:login:a"]);
        assert_eq!(counts[1].1.count, 2);
        assert_eq!(counts[1].1.resets_in, Duration::from_secs(40));
    }
}
