//! Persisted refresh token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side state for one issued refresh token.
///
/// Access tokens are never stored; refresh tokens are, so that they can
/// be rotated on use and revoked on logout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// The token's `jti` claim.
    pub jti: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Login session shared by every pair rotated from the same login.
    pub session_id: Uuid,
    /// Embedded expiry.
    pub expires_at: DateTime<Utc>,
    /// Set when rotated or revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether this record may still be exchanged.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Data required to persist a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefreshToken {
    /// The token's `jti` claim.
    pub jti: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Login session.
    pub session_id: Uuid,
    /// Embedded expiry.
    pub expires_at: DateTime<Utc>,
}
