//! Cache key builders for every Bazaar cache entry.
//!
//! The Redis provider prepends its configured prefix, so keys here are
//! unprefixed.

use uuid::Uuid;

/// Fixed-window counter for one route class and client.
pub fn rate_limit(class: &str, client: &str) -> String {
    format!("rate:{class}:{client}")
}

/// Prefix shared by every counter of one route class.
pub fn rate_limit_class(class: &str) -> String {
    format!("rate:{class}:")
}

/// Failed login counter for a normalized email.
pub fn login_failures(email: &str) -> String {
    format!("login:failures:{email}")
}

/// Lockout marker for a normalized email.
pub fn lockout(email: &str) -> String {
    format!("login:locked:{email}")
}

/// Denylist entry for a revoked access token.
pub fn token_denylist(jti: Uuid) -> String {
    format!("jwt:denied:{jti}")
}

/// Denylist entry for every access token of a login session.
pub fn session_revoked(session_id: Uuid) -> String {
    format!("session:revoked:{session_id}")
}

/// Security state that must outlive capacity eviction: denylists,
/// lockouts and failure counters.
pub fn is_pinned(key: &str) -> bool {
    ["jwt:denied:", "session:revoked:", "login:locked:", "login:failures:"]
        .iter()
        .any(|prefix| key.starts_with(prefix))
}
