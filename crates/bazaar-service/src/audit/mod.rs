//! Security audit trail and alert webhook.

pub mod webhook;
pub mod writer;

pub use webhook::{WebhookNotifier, WebhookPayload};
pub use writer::AuditWriter;
