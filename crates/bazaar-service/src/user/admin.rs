//! Admin user management: listing and role changes.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use bazaar_auth::SessionManager;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_database::store::UserStore;
use bazaar_entity::audit::AuditEventType;
use bazaar_entity::user::{User, UserRole};

use crate::audit::AuditWriter;
use crate::context::RequestContext;

/// Handles administrative user management operations.
///
/// Methods take an optional request context: `None` means an operator
/// acting through the CLI, which is trusted.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    audit: AuditWriter,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionManager, audit: AuditWriter) -> Self {
        Self {
            users,
            sessions,
            audit,
        }
    }

    /// Lists users, newest first.
    pub async fn list_users(
        &self,
        actor: Option<&RequestContext>,
        role: Option<UserRole>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        require_admin(actor)?;
        self.users.list(role, page).await
    }

    /// Change a user's role and end their sessions so the next token
    /// carries the new role.
    pub async fn set_role(
        &self,
        actor: Option<&RequestContext>,
        user_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        require_admin(actor)?;
        if actor.is_some_and(|ctx| ctx.user_id == user_id) {
            return Err(AppError::validation_field(
                "role",
                "Administrators cannot change their own role",
            ));
        }

        let current = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if current.role == role {
            return Ok(current);
        }

        let updated = self.users.update_role(user_id, role).await?;
        let revoked = self.sessions.revoke_user(user_id).await?;
        info!(
            user_id = %user_id,
            from = %current.role,
            to = %role,
            revoked,
            "User role changed"
        );

        self.audit
            .record(
                AuditEventType::RoleChanged,
                Some(user_id),
                actor.map(|ctx| &ctx.client),
                Some(json!({
                    "from": current.role,
                    "to": role,
                    "changedBy": actor.map(|ctx| ctx.user_id),
                })),
            )
            .await;
        Ok(updated)
    }
}

fn require_admin(actor: Option<&RequestContext>) -> AppResult<()> {
    match actor {
        Some(ctx) => ctx.require_role(&[UserRole::Admin]),
        None => Ok(()),
    }
}
