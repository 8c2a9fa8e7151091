//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An append-only record of a security event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user involved, when known.
    pub user_id: Option<Uuid>,
    /// Event type (see `AuditEventType::as_str`).
    pub event_type: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// SHA-256 of the client user agent.
    pub user_agent_hash: Option<String>,
    /// Event-specific details.
    pub metadata: Option<serde_json::Value>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The user involved, when known.
    pub user_id: Option<Uuid>,
    /// Event type.
    pub event_type: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// SHA-256 of the client user agent.
    pub user_agent_hash: Option<String>,
    /// Event-specific details.
    pub metadata: Option<serde_json::Value>,
}
