//! Fixed-window rate limit configuration per route class.

use serde::{Deserialize, Serialize};

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Master switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `POST /register`.
    #[serde(default = "default_register")]
    pub register: WindowConfig,
    /// `POST /login` and `POST /refresh`.
    #[serde(default = "default_login")]
    pub login: WindowConfig,
    /// Every other API route.
    #[serde(default = "default_api")]
    pub api: WindowConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            register: default_register(),
            login: default_login(),
            api: default_api(),
        }
    }
}

/// A cap of `max_requests` per `window_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Requests admitted per window.
    pub max_requests: u64,
    /// Window length in seconds.
    pub window_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_register() -> WindowConfig {
    WindowConfig {
        max_requests: 5,
        window_seconds: 24 * 3600,
    }
}

fn default_login() -> WindowConfig {
    WindowConfig {
        max_requests: 10,
        window_seconds: 6 * 60,
    }
}

fn default_api() -> WindowConfig {
    WindowConfig {
        max_requests: 100,
        window_seconds: 15 * 60,
    }
}
