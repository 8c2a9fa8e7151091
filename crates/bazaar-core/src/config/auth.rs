//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Secrets that must never reach a running server.
pub const PLACEHOLDER_SECRETS: &[&str] = &["CHANGE_ME", "CHANGE_ME_IN_PRODUCTION", "secret"];

/// Minimum accepted length of a signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted access token lifetime (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

/// Longest accepted refresh token lifetime (one year).
pub const MAX_REFRESH_TTL_DAYS: u64 = 365;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default)]
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    #[serde(default)]
    pub refresh_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Allowed clock skew when checking `exp`, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
    /// Include the client IP in the token binding fingerprint.
    #[serde(default = "default_true")]
    pub bind_client_ip: bool,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 parallelism.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Characters accepted as the required password symbol.
    #[serde(default = "default_password_symbols")]
    pub password_symbols: String,
    /// Maximum failed login attempts per email before lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u64,
    /// Account lockout duration in minutes; also the failure-counting window.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            leeway_seconds: 0,
            bind_client_ip: true,
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            password_symbols: default_password_symbols(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
        }
    }
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}

fn default_password_min() -> usize {
    8
}

fn default_password_max() -> usize {
    128
}

fn default_password_symbols() -> String {
    "@$!%*?&".to_string()
}

fn default_max_failed() -> u64 {
    5
}

fn default_lockout() -> u64 {
    15
}
