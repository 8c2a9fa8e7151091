//! JWT token creation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use bazaar_core::config::auth::{AuthConfig, MAX_ACCESS_TTL_MINUTES, MAX_REFRESH_TTL_DAYS};
use bazaar_core::error::AppError;
use bazaar_entity::session::TokenPair;
use bazaar_entity::user::UserRole;

use super::claims::{Claims, TokenType};

/// Signs access and refresh tokens with separate HS256 secrets.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: ttl(config.access_ttl_minutes.min(MAX_ACCESS_TTL_MINUTES), 60),
            refresh_ttl: ttl(config.refresh_ttl_days.min(MAX_REFRESH_TTL_DAYS), 24 * 3600),
        }
    }

    /// Issue an access/refresh pair for one login session.
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        role: UserRole,
        session_id: Uuid,
        fingerprint: &str,
    ) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access = self.claims(user_id, role, session_id, fingerprint, TokenType::Access, now);
        let refresh = self.claims(user_id, role, session_id, fingerprint, TokenType::Refresh, now);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            access_expires_at: access.expires_at(),
            refresh_expires_at: refresh.expires_at(),
            access_jti: access.jti,
            refresh_jti: refresh.jti,
            session_id,
        })
    }

    /// Sign arbitrary claims with the key matching their type.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        let key = match claims.typ {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };
        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    fn claims(
        &self,
        user_id: Uuid,
        role: UserRole,
        session_id: Uuid,
        fingerprint: &str,
        typ: TokenType,
        now: chrono::DateTime<Utc>,
    ) -> Claims {
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        Claims {
            sub: user_id,
            sid: session_id,
            role,
            bfp: fingerprint.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
            typ,
        }
    }
}

/// Lifetime of `units` periods of `unit_seconds` each, saturating instead of
/// panicking on oversized input.
fn ttl(units: u64, unit_seconds: i64) -> Duration {
    let seconds = i64::try_from(units)
        .unwrap_or(i64::MAX)
        .saturating_mul(unit_seconds);
    Duration::try_seconds(seconds).unwrap_or(Duration::MAX)
}
