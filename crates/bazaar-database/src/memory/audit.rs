//! In-memory audit log.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use super::paginate;
use crate::store::AuditStore;

/// Append-only audit log held in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let stored = AuditLogEntry {
            id: Uuid::now_v7(),
            user_id: entry.user_id,
            event_type: entry.event_type.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent_hash: entry.user_agent_hash.clone(),
            metadata: entry.metadata.clone(),
            created_at: Utc::now(),
        };
        self.entries.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        event_type: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let entries = self.entries.read().await;
        let matching: Vec<AuditLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| user_id.is_none_or(|id| e.user_id == Some(id)))
            .filter(|e| event_type.is_none_or(|t| e.event_type == t))
            .cloned()
            .collect();
        Ok(paginate(&matching, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(user_id: Uuid, event_type: &str) -> CreateAuditLogEntry {
        CreateAuditLogEntry {
            user_id: Some(user_id),
            event_type: event_type.to_string(),
            ip_address: Some("203.0.113.9".to_string()),
            user_agent_hash: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filtered() {
        let store = MemoryAuditStore::new();
        let user = Uuid::new_v4();
        store.append(&event(user, "login.failed")).await.unwrap();
        store.append(&event(user, "account.locked")).await.unwrap();
        store.append(&event(Uuid::new_v4(), "login.failed")).await.unwrap();

        let mine = store.list(Some(user), None, &PageRequest::default()).await.unwrap();
        assert_eq!(mine.total_items, 2);
        assert_eq!(mine.items[0].event_type, "account.locked");

        let failed = store
            .list(None, Some("login.failed"), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(failed.total_items, 2);
    }
}
