//! Security audit entities.

pub mod event;
pub mod model;

pub use event::AuditEventType;
pub use model::{AuditLogEntry, CreateAuditLogEntry};
