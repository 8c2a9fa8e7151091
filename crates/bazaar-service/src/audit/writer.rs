//! Audit log writer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use bazaar_auth::BindingContext;
use bazaar_core::config::audit::AuditConfig;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_database::store::AuditStore;
use bazaar_entity::audit::{AuditEventType, AuditLogEntry, CreateAuditLogEntry};

use super::webhook::{WebhookNotifier, WebhookPayload};

/// Records security events.
///
/// Writing is best-effort: a failed insert is logged and swallowed so the
/// request that triggered the event still completes.
#[derive(Debug, Clone)]
pub struct AuditWriter {
    store: Arc<dyn AuditStore>,
    webhook: Option<WebhookNotifier>,
}

impl AuditWriter {
    /// Creates a writer, with a webhook when `audit.webhook_url` is set.
    pub fn new(store: Arc<dyn AuditStore>, config: &AuditConfig) -> AppResult<Self> {
        let webhook = match config.webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(WebhookNotifier::new(
                url,
                Duration::from_secs(config.webhook_timeout_seconds),
            )?),
            _ => None,
        };
        Ok(Self { store, webhook })
    }

    /// Whether events are also forwarded to a webhook.
    pub fn has_webhook(&self) -> bool {
        self.webhook.is_some()
    }

    /// Record one event.
    pub async fn record(
        &self,
        event: AuditEventType,
        user_id: Option<Uuid>,
        client: Option<&BindingContext>,
        metadata: Option<serde_json::Value>,
    ) {
        let ip = client.map(|c| c.ip.as_str());

        if event.is_alert() {
            warn!(event = %event, user_id = ?user_id, ip = ?ip, "Security event");
        } else {
            info!(event = %event, user_id = ?user_id, ip = ?ip, "Security event");
        }

        let entry = CreateAuditLogEntry {
            user_id,
            event_type: event.as_str().to_string(),
            ip_address: ip.map(String::from),
            user_agent_hash: client.map(|c| c.user_agent_hash.clone()),
            metadata,
        };
        if let Err(e) = self.store.append(&entry).await {
            error!(event = %event, error = %e, "Failed to persist audit entry");
        }

        if let Some(webhook) = &self.webhook {
            webhook.notify(WebhookPayload::new(event, user_id, ip));
        }
    }

    /// List entries, newest first.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        event: Option<AuditEventType>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.store
            .list(user_id, event.map(|e| e.as_str()), page)
            .await
    }
}
