//! Session lifecycle manager.
//!
//! Access tokens are stateless apart from two denylists: one per token
//! and one per login session. Logout, refresh reuse and role changes fill
//! the session denylist so that every access token already issued to the
//! affected sessions stops working. Refresh tokens are persisted so that each one can be exchanged
//! exactly once; presenting a spent refresh token revokes every session of
//! its owner.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use bazaar_cache::CacheManager;
use bazaar_cache::keys;
use bazaar_core::config::auth::{AuthConfig, MAX_ACCESS_TTL_MINUTES};
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::cache::CacheProvider;
use bazaar_database::store::{RefreshTokenStore, UserStore};
use bazaar_entity::session::{CreateRefreshToken, TokenPair};
use bazaar_entity::user::User;

use crate::binding::BindingContext;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};

/// Why a presented token was refused.
///
/// The variants other than `Invalid` are security events the caller is
/// expected to audit before answering 401.
#[derive(Debug)]
pub enum SessionRejection {
    /// Malformed, expired, revoked, or otherwise unusable.
    Invalid(AppError),
    /// Valid token presented from a different client.
    ContextMismatch {
        /// Token subject.
        user_id: Uuid,
        /// Token session.
        session_id: Uuid,
    },
    /// An already rotated refresh token was presented again.
    RefreshReuse {
        /// Token subject.
        user_id: Uuid,
        /// Token session.
        session_id: Uuid,
        /// Refresh records revoked in response.
        revoked: u64,
    },
}

impl From<AppError> for SessionRejection {
    fn from(err: AppError) -> Self {
        Self::Invalid(err)
    }
}

impl From<SessionRejection> for AppError {
    fn from(rejection: SessionRejection) -> Self {
        match rejection {
            SessionRejection::Invalid(err) => err,
            SessionRejection::ContextMismatch { .. } => {
                AppError::authentication("Session context mismatch")
            }
            SessionRejection::RefreshReuse { .. } => {
                AppError::authentication("Refresh token has been revoked")
            }
        }
    }
}

/// Manages the token lifecycle.
#[derive(Debug, Clone)]
pub struct SessionManager {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    cache: CacheManager,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    bind_client_ip: bool,
    /// How long a session denylist entry must live to outlast any access
    /// token of that session.
    access_lifetime: Duration,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        config: &AuthConfig,
        cache: CacheManager,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            cache,
            users,
            refresh_tokens,
            bind_client_ip: config.bind_client_ip,
            access_lifetime: Duration::from_secs(
                config
                    .access_ttl_minutes
                    .clamp(1, MAX_ACCESS_TTL_MINUTES)
                    .saturating_mul(60)
                    .saturating_add(config.leeway_seconds),
            ),
        }
    }

    /// Start a new login session bound to `ctx`.
    pub async fn issue(&self, user: &User, ctx: &BindingContext) -> AppResult<TokenPair> {
        self.issue_for_session(user, Uuid::new_v4(), ctx).await
    }

    async fn issue_for_session(
        &self,
        user: &User,
        session_id: Uuid,
        ctx: &BindingContext,
    ) -> AppResult<TokenPair> {
        let fingerprint = ctx.fingerprint(self.bind_client_ip);
        let pair = self
            .encoder
            .issue_pair(user.id, user.role, session_id, &fingerprint)?;

        self.refresh_tokens
            .create(&CreateRefreshToken {
                jti: pair.refresh_jti,
                user_id: user.id,
                session_id,
                expires_at: pair.refresh_expires_at,
            })
            .await?;

        Ok(pair)
    }

    /// Validate an access token for a request from `ctx`.
    ///
    /// Checks, in order: signature, expiry and type; client binding;
    /// the token and session denylists.
    pub async fn authenticate(
        &self,
        token: &str,
        ctx: &BindingContext,
    ) -> Result<Claims, SessionRejection> {
        let claims = self.decoder.decode_access(token)?;
        self.check_binding(&claims, ctx)?;

        if self.cache.exists(&keys::token_denylist(claims.jti)).await? {
            return Err(AppError::authentication("Token has been revoked").into());
        }
        if self.cache.exists(&keys::session_revoked(claims.sid)).await? {
            return Err(AppError::authentication("Session has been revoked").into());
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair in the same session.
    pub async fn refresh(
        &self,
        token: &str,
        ctx: &BindingContext,
    ) -> Result<(User, TokenPair), SessionRejection> {
        let claims = self.decoder.decode_refresh(token)?;
        self.check_binding(&claims, ctx)?;

        let record = self
            .refresh_tokens
            .find(claims.jti)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        if record.revoked_at.is_some() || !self.refresh_tokens.revoke(claims.jti).await? {
            let revoked = self.revoke_user(claims.sub).await?;
            warn!(
                user_id = %claims.sub,
                session_id = %claims.sid,
                revoked,
                "Refresh token reuse detected, revoked all sessions"
            );
            return Err(SessionRejection::RefreshReuse {
                user_id: claims.sub,
                session_id: claims.sid,
                revoked,
            });
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        let pair = self.issue_for_session(&user, claims.sid, ctx).await?;
        info!(user_id = %user.id, session_id = %claims.sid, "Token refreshed");
        Ok((user, pair))
    }

    /// End the session an access token belongs to.
    pub async fn logout(&self, claims: &Claims) -> AppResult<u64> {
        let ttl = Duration::from_secs(claims.remaining_ttl_seconds().max(1));
        self.cache
            .set(&keys::token_denylist(claims.jti), "revoked", ttl)
            .await?;

        self.deny_session(claims.sid).await?;

        let revoked = self.refresh_tokens.revoke_session(claims.sid).await?;
        info!(user_id = %claims.sub, session_id = %claims.sid, revoked, "Logged out");
        Ok(revoked)
    }

    /// End every session of a user, e.g. after a role change.
    ///
    /// Access tokens already issued stop authenticating immediately and
    /// refresh tokens can no longer be exchanged. Returns the number of
    /// refresh records revoked.
    pub async fn revoke_user(&self, user_id: Uuid) -> AppResult<u64> {
        let sessions = self.refresh_tokens.session_ids_for_user(user_id).await?;
        for session_id in &sessions {
            self.deny_session(*session_id).await?;
        }
        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, sessions = sessions.len(), revoked, "Revoked user sessions");
        Ok(revoked)
    }

    async fn deny_session(&self, session_id: Uuid) -> AppResult<()> {
        self.cache
            .set(&keys::session_revoked(session_id), "revoked", self.access_lifetime)
            .await
    }

    fn check_binding(&self, claims: &Claims, ctx: &BindingContext) -> Result<(), SessionRejection> {
        if claims.bfp == ctx.fingerprint(self.bind_client_ip) {
            return Ok(());
        }
        warn!(user_id = %claims.sub, session_id = %claims.sid, "Session context mismatch");
        Err(SessionRejection::ContextMismatch {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }
}
