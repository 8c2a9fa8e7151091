//! Per-email login lockout.

use std::time::Duration;

use tracing::warn;

use bazaar_cache::{CacheManager, keys};
use bazaar_core::config::auth::AuthConfig;
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::CacheProvider;

/// Counts failed logins per normalized email in a fixed window and locks
/// the email once the cap is reached.
#[derive(Debug, Clone)]
pub struct LoginLockout {
    cache: CacheManager,
    max_failures: u64,
    duration: Duration,
}

impl LoginLockout {
    /// Creates a lockout tracker from the auth settings.
    pub fn new(cache: CacheManager, config: &AuthConfig) -> Self {
        Self {
            cache,
            max_failures: config.max_failed_attempts.max(1),
            duration: Duration::from_secs(config.lockout_duration_minutes * 60),
        }
    }

    /// How long a lockout lasts.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether `email` is currently locked.
    pub async fn is_locked(&self, email: &str) -> AppResult<bool> {
        self.cache.exists(&keys::lockout(email)).await
    }

    /// Count one failure. Returns `true` when this failure locked the email.
    pub async fn register_failure(&self, email: &str) -> AppResult<bool> {
        let failures = self
            .cache
            .incr_window(&keys::login_failures(email), self.duration)
            .await?;
        if failures.count < self.max_failures {
            return Ok(false);
        }

        self.cache
            .set(&keys::lockout(email), "locked", self.duration)
            .await?;
        self.cache.delete(&keys::login_failures(email)).await?;
        warn!(attempts = failures.count, "Login locked after repeated failures");
        Ok(true)
    }

    /// Forget earlier failures after a successful login.
    pub async fn clear(&self, email: &str) -> AppResult<()> {
        self.cache.delete(&keys::login_failures(email)).await
    }
}
