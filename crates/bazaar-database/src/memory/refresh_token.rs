//! In-memory refresh token store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_entity::session::{CreateRefreshToken, RefreshTokenRecord};

use crate::store::RefreshTokenStore;

/// Refresh token records keyed by `jti`.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    inner: RwLock<HashMap<Uuid, RefreshTokenRecord>>,
}

impl MemoryRefreshTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn revoke_where(&self, pred: impl Fn(&RefreshTokenRecord) -> bool) -> u64 {
        let now = Utc::now();
        let mut records = self.inner.write().await;
        let mut count = 0;
        for record in records.values_mut() {
            if record.revoked_at.is_none() && pred(record) {
                record.revoked_at = Some(now);
                count += 1;
            }
        }
        count
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshTokenRecord> {
        let mut records = self.inner.write().await;
        if records.contains_key(&data.jti) {
            return Err(AppError::conflict("Refresh token already recorded"));
        }
        let record = RefreshTokenRecord {
            jti: data.jti,
            user_id: data.user_id,
            session_id: data.session_id,
            expires_at: data.expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        records.insert(record.jti, record.clone());
        Ok(record)
    }

    async fn find(&self, jti: Uuid) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.inner.read().await.get(&jti).cloned())
    }

    async fn revoke(&self, jti: Uuid) -> AppResult<bool> {
        Ok(self.revoke_where(|r| r.jti == jti).await == 1)
    }

    async fn revoke_session(&self, session_id: Uuid) -> AppResult<u64> {
        Ok(self.revoke_where(|r| r.session_id == session_id).await)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(self.revoke_where(|r| r.user_id == user_id).await)
    }

    async fn session_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let now = Utc::now();
        let records = self.inner.read().await;
        let mut sessions: Vec<Uuid> = records
            .values()
            .filter(|r| r.user_id == user_id && r.expires_at > now)
            .map(|r| r.session_id)
            .collect();
        sessions.sort_unstable();
        sessions.dedup();
        Ok(sessions)
    }
}
