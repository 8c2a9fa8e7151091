//! Data backfill commands.

use clap::{Args, Subcommand};

use bazaar_core::config::AppConfig;
use bazaar_core::result::AppResult;
use bazaar_service::CountryBackfill;

use crate::output::{self, OutputFormat};

/// Arguments for backfill commands
#[derive(Debug, Args)]
pub struct BackfillArgs {
    /// Backfill subcommand
    #[command(subcommand)]
    pub command: BackfillCommand,
}

/// Backfill subcommands
#[derive(Debug, Subcommand)]
pub enum BackfillCommand {
    /// Give every product without a country a random one from the configured list
    Countries {
        /// Report the plan without writing
        #[arg(long)]
        dry_run: bool,
        /// Products per transaction (defaults to backfill.batch_size)
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

/// Execute backfill commands
pub async fn execute(args: &BackfillArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let db = super::connect_db(config).await?;

    match &args.command {
        BackfillCommand::Countries {
            dry_run,
            batch_size,
        } => {
            let mut job = CountryBackfill::new(db.products.clone(), config.backfill.clone());
            if let Some(size) = batch_size {
                job = job.with_batch_size(*size);
            }

            let result = job.run(*dry_run).await;
            db.close().await;
            let report = result?;

            if report.candidates == 0 {
                output::print_success("No products are missing a country.");
                return Ok(());
            }
            output::print_item(&report, format);
            if report.dry_run {
                output::print_warning("Dry run: nothing was written.");
            } else {
                output::print_success(&format!("Updated {} products.", report.updated));
            }
        }
    }

    Ok(())
}
