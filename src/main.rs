//! Bazaar server: multi-vendor marketplace backend.
//!
//! Main entry point that loads configuration, sets up logging, and runs
//! the HTTP server until shutdown.

use tracing_subscriber::{EnvFilter, fmt};

use bazaar_core::config::AppConfig;
use bazaar_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!("Starting Bazaar v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = bazaar_api::run_server(config).await {
        tracing::error!(error = %e, chain = ?e.chain(), "Server error");
        std::process::exit(1);
    }
}

/// Load configuration for `BAZAAR_ENV` and reject unusable settings.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("BAZAAR_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
