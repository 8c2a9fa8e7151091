//! Security audit configuration.

use serde::{Deserialize, Serialize};

/// Audit log and alert webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Webhook receiving security alerts. Disabled when absent.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Webhook request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub webhook_timeout_seconds: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
