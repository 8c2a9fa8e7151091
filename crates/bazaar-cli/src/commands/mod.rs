//! CLI command definitions and dispatch.

pub mod audit;
pub mod backfill;
pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};

use bazaar_auth::SessionManager;
use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::Database;
use bazaar_service::{AdminUserService, AuditWriter};

use crate::output::OutputFormat;

/// Bazaar marketplace administration
#[derive(Debug, Parser)]
#[command(name = "bazaar", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (selects config/{env}.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User and role management
    User(user::UserArgs),
    /// Security audit log
    Audit(audit::AuditArgs),
    /// Data backfill jobs
    Backfill(backfill::BackfillArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        let config = load_config(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Audit(args) => audit::execute(args, &config, self.format).await,
            Commands::Backfill(args) => backfill::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load and validate configuration for an environment
pub fn load_config(env: &str) -> AppResult<AppConfig> {
    let config = AppConfig::load(env)?;
    config.validate()?;
    Ok(config)
}

/// Helper: connect the configured database
pub async fn connect_db(config: &AppConfig) -> AppResult<Database> {
    if config.database.provider == "memory" {
        return Err(AppError::configuration(
            "The CLI needs a persistent database; database.provider is 'memory'",
        ));
    }
    Database::connect(&config.database).await
}

/// Helper: the role-management service, as used by the API
pub async fn admin_service(config: &AppConfig, db: &Database) -> AppResult<AdminUserService> {
    let cache = CacheManager::new(&config.cache).await?;
    let sessions = SessionManager::new(
        &config.auth,
        cache,
        db.users.clone(),
        db.refresh_tokens.clone(),
    );
    let audit = AuditWriter::new(db.audit.clone(), &config.audit)?;
    Ok(AdminUserService::new(db.users.clone(), sessions, audit))
}
