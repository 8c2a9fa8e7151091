//! Fire-and-forget security alert webhook.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_entity::audit::AuditEventType;

/// JSON body posted to the webhook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Chat-friendly one-line summary.
    pub text: String,
    /// Event type, e.g. `login.failed`.
    pub event: &'static str,
    /// Subject of the event, if known.
    pub user_id: Option<Uuid>,
    /// Client address, if known.
    pub ip_address: Option<String>,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
}

impl WebhookPayload {
    /// Build the payload for one event.
    pub fn new(event: AuditEventType, user_id: Option<Uuid>, ip_address: Option<&str>) -> Self {
        let user = user_id.map_or_else(|| "unknown".to_string(), |id| id.to_string());
        let ip = ip_address.unwrap_or("unknown");
        Self {
            text: format!("Security Event: {event} for user {user}\nIP: {ip}"),
            event: event.as_str(),
            user_id,
            ip_address: ip_address.map(String::from),
            occurred_at: Utc::now(),
        }
    }
}

/// Posts audit events to an external URL without blocking the caller.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build webhook client", e)
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `payload` in a background task. Failures are only logged.
    pub fn notify(&self, payload: WebhookPayload) {
        let client = self.client.clone();
        let url = self.url.clone();
        tokio::spawn(async move {
            let event = payload.event;
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(event, "Audit webhook delivered");
                }
                Ok(resp) => {
                    warn!(event, status = %resp.status(), "Audit webhook rejected the event");
                }
                Err(e) => {
                    warn!(event, error = %e, "Audit webhook delivery failed");
                }
            }
        });
    }
}
