//! Token value types returned on login and refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived API credential.
    pub access_token: String,
    /// Long-lived credential for `/refresh` only.
    pub refresh_token: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
    /// Access token `jti`.
    pub access_jti: Uuid,
    /// Refresh token `jti`.
    pub refresh_jti: Uuid,
    /// Login session id shared by both tokens.
    pub session_id: Uuid,
}
