//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use bazaar_core::config::AppConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::PageRequest;
use bazaar_database::Database;
use bazaar_entity::user::{User, UserRole, normalize_email};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users, newest first
    List {
        /// Filter by role (BUYER, SELLER, ADMIN)
        #[arg(short, long)]
        role: Option<String>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Users per page
        #[arg(long, default_value_t = 25)]
        per_page: u64,
    },
    /// Change a user's role and end their sessions
    SetRole {
        /// Email address or user ID
        user: String,
        /// New role (BUYER, SELLER, ADMIN)
        role: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Created at
    created_at: String,
    /// Last login
    last_login: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            role: u.role.to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_login: u
                .last_login
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let db = super::connect_db(config).await?;
    let admin = super::admin_service(config, &db).await?;

    match &args.command {
        UserCommand::List {
            role,
            page,
            per_page,
        } => {
            let role = role.as_deref().map(str::parse::<UserRole>).transpose()?;
            let users = admin
                .list_users(None, role, &PageRequest::new(*page, *per_page))
                .await?;

            let rows: Vec<UserRow> = users.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            output::print_page_footer(users.page, users.total_pages, users.total_items, format);
        }
        UserCommand::SetRole { user, role, yes } => {
            let role: UserRole = role.parse()?;
            let target = resolve_user(&db, user).await?;

            if target.role == role {
                output::print_warning(&format!("{} is already {}", target.email, role));
                return Ok(());
            }

            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Change {} from {} to {}? Their sessions will end.",
                        target.email, target.role, role
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
                if !confirm {
                    output::print_warning("Aborted.");
                    return Ok(());
                }
            }

            let updated = admin.set_role(None, target.id, role).await?;
            output::print_success(&format!("{} is now {}", updated.email, updated.role));
        }
    }

    db.close().await;
    Ok(())
}

/// Look a user up by ID or email.
async fn resolve_user(db: &Database, user: &str) -> AppResult<User> {
    let found = match Uuid::parse_str(user) {
        Ok(id) => db.users.find_by_id(id).await?,
        Err(_) => db.users.find_by_email(&normalize_email(user)).await?,
    };
    found.ok_or_else(|| AppError::not_found(format!("User '{user}' not found")))
}
