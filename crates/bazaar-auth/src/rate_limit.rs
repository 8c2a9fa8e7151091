//! Fixed-window rate limiter over the shared counter store.
//!
//! Each `(route class, client key)` pair owns one counter whose window
//! opens at the first hit. Because windows are fixed, a client can land up
//! to twice the cap across a window boundary; this is accepted.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use bazaar_cache::CacheManager;
use bazaar_cache::keys;
use bazaar_core::config::rate_limit::{RateLimitConfig, WindowConfig};
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::CacheProvider;

/// Groups of routes that share a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// `POST /register`.
    Register,
    /// `POST /login`, `POST /refresh`.
    Login,
    /// Everything else.
    Api,
}

impl RouteClass {
    /// Every class, in reporting order.
    pub const ALL: [RouteClass; 3] = [Self::Register, Self::Login, Self::Api];

    /// Key segment for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Cap for the window.
    pub limit: u64,
    /// Requests left in the window after this one.
    pub remaining: u64,
    /// Time until the window resets.
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Whole seconds until reset, rounded up so clients never retry early.
    pub fn reset_seconds(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Live counters of one route class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUsage {
    /// Route class.
    pub class: RouteClass,
    /// Configured window.
    pub window: WindowConfig,
    /// Open windows, busiest first.
    pub clients: Vec<ClientUsage>,
}

/// One client's open window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientUsage {
    /// Client key (IP address).
    pub client: String,
    /// Hits so far.
    pub count: u64,
    /// Time until the window resets.
    pub resets_in: Duration,
}

/// Fixed-window limiter.
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    cache: CacheManager,
    config: RateLimitConfig,
}

impl FixedWindowLimiter {
    /// Create a limiter over the shared cache.
    pub fn new(cache: CacheManager, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    /// Whether limiting is switched on.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// The configured window for a class.
    pub fn window(&self, class: RouteClass) -> WindowConfig {
        match class {
            RouteClass::Register => self.config.register,
            RouteClass::Login => self.config.login,
            RouteClass::Api => self.config.api,
        }
    }

    /// Count one hit and decide whether it is admitted.
    ///
    /// Counter store errors propagate, so the request fails rather than
    /// slipping through unlimited.
    pub async fn check(&self, class: RouteClass, client_key: &str) -> AppResult<RateLimitDecision> {
        let window = self.window(class);
        let key = keys::rate_limit(class.as_str(), client_key);
        let hit = self
            .cache
            .incr_window(&key, Duration::from_secs(window.window_seconds))
            .await?;

        let allowed = hit.count <= window.max_requests;
        if !allowed {
            debug!(class = %class, client = client_key, count = hit.count, "Rate limit exceeded");
        }

        Ok(RateLimitDecision {
            allowed,
            limit: window.max_requests,
            remaining: window.max_requests.saturating_sub(hit.count),
            reset_after: hit.resets_in,
        })
    }

    /// Read every open window without counting a hit.
    pub async fn usage(&self) -> AppResult<Vec<ClassUsage>> {
        let mut usage = Vec::with_capacity(RouteClass::ALL.len());
        for class in RouteClass::ALL {
            let prefix = keys::rate_limit_class(class.as_str());
            let mut clients: Vec<ClientUsage> = self
                .cache
                .window_counts(&prefix)
                .await?
                .into_iter()
                .map(|(key, hit)| ClientUsage {
                    client: key.strip_prefix(&prefix).unwrap_or(&key).to_string(),
                    count: hit.count,
                    resets_in: hit.resets_in,
                })
                .collect();
            clients.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.client.cmp(&b.client)));
            usage.push(ClassUsage {
                class,
                window: self.window(class),
                clients,
            });
        }
        Ok(usage)
    }
}
