//! Request context carrying the authenticated user, session, and client.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bazaar_auth::{BindingContext, Claims};
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer once the access token has been validated and
/// passed into service methods so that every operation knows who is
/// acting, from which session, and from which client.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current login session.
    pub session_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// Client address and user-agent hash.
    pub client: BindingContext,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Build a context from validated claims.
    pub fn from_claims(claims: &Claims, client: BindingContext) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
            role: claims.role,
            client,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with 403 unless the token role is one of `allowed`.
    pub fn require_role(&self, allowed: &[UserRole]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "This action requires role {}",
                allowed
                    .iter()
                    .map(UserRole::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ")
            )))
        }
    }
}
