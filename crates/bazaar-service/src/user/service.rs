//! User self-service operations.

use std::sync::Arc;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::store::UserStore;
use bazaar_entity::user::User;

use crate::context::RequestContext;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// The caller's own profile, read fresh from the store.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
