//! Database migration management commands.

use clap::{Args, Subcommand};
use tracing::info;

use bazaar_core::config::AppConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::DatabasePool;
use bazaar_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    if config.database.provider != "postgres" {
        return Err(AppError::configuration(
            "Migrations only apply to the postgres database provider",
        ));
    }
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            info!(url = %redact(&config.database.url), "Migrations applied");
            output::print_success("All migrations applied successfully.");
        }
    }

    pool.close().await;
    Ok(())
}

/// Hide the password in a connection URL.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            let credentials = &url[scheme + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{user}:***{}", &url[..scheme + 3], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_password() {
        assert_eq!(
            redact("postgres://bazaar:hunter2@db:5432/bazaar"),
            "postgres://bazaar:***@db:5432/bazaar"
        );
        assert_eq!(redact("postgres://db/bazaar"), "postgres://db/bazaar");
    }
}
