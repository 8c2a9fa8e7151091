//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use crate::store::AuditStore;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            r#"INSERT INTO audit_log (id, user_id, event_type, ip_address, user_agent_hash, metadata)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(entry.user_id)
        .bind(&entry.event_type)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent_hash)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write audit entry", e))
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        event_type: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM audit_log
               WHERE ($1::uuid IS NULL OR user_id = $1)
                 AND ($2::text IS NULL OR event_type = $2)"#,
        )
        .bind(user_id)
        .bind(event_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count audit log", e))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"SELECT * FROM audit_log
               WHERE ($1::uuid IS NULL OR user_id = $1)
                 AND ($2::text IS NULL OR event_type = $2)
               ORDER BY created_at DESC, id DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(user_id)
        .bind(event_type)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search audit log", e))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
