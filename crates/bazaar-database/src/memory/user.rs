//! In-memory user store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::user::{CreateUser, User, UserRole};

use super::paginate;
use crate::store::UserStore;

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Process-local user store with a unique email index.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Users>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.inner.write().await;
        if users.by_email.contains_key(&data.email) {
            return Err(AppError::conflict("Email is already registered"));
        }

        let user = User {
            id: Uuid::now_v7(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            membership: false,
            pro_seller: false,
            created_at: Utc::now(),
            last_login: None,
        };
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.inner.read().await;
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn list(
        &self,
        role: Option<UserRole>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let users = self.inner.read().await;
        let mut matching: Vec<User> = users
            .by_id
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&matching, page))
    }

    async fn update_last_login(&self, id: Uuid) -> AppResult<()> {
        if let Some(user) = self.inner.write().await.by_id.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut users = self.inner.write().await;
        let user = users
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.role = role;
        Ok(user.clone())
    }
}
