//! Audit log CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use bazaar_core::config::AppConfig;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::PageRequest;
use bazaar_entity::audit::{AuditEventType, AuditLogEntry};
use bazaar_service::AuditWriter;

use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List security events, newest first
    List {
        /// Only events about this user
        #[arg(short, long)]
        user_id: Option<Uuid>,
        /// Only this event type, e.g. login.failed
        #[arg(short, long)]
        event: Option<String>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Entries per page
        #[arg(long, default_value_t = 50)]
        per_page: u64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    time: String,
    event: String,
    user: String,
    ip: String,
    metadata: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(e: &AuditLogEntry) -> Self {
        Self {
            time: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            event: e.event_type.clone(),
            user: e.user_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            ip: e.ip_address.clone().unwrap_or_else(|| "-".to_string()),
            metadata: e
                .metadata
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute audit commands
pub async fn execute(args: &AuditArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let db = super::connect_db(config).await?;
    let audit = AuditWriter::new(db.audit.clone(), &config.audit)?;

    match &args.command {
        AuditCommand::List {
            user_id,
            event,
            page,
            per_page,
        } => {
            let event = event
                .as_deref()
                .map(str::parse::<AuditEventType>)
                .transpose()?;
            let entries = audit
                .list(*user_id, event, &PageRequest::new(*page, *per_page))
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&entries.items),
                OutputFormat::Table => {
                    let rows: Vec<AuditRow> = entries.items.iter().map(AuditRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
            output::print_page_footer(
                entries.page,
                entries.total_pages,
                entries.total_items,
                format,
            );
        }
    }

    db.close().await;
    Ok(())
}
