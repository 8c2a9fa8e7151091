//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Configuration is loaded once at startup and handed to each
//! component's constructor; nothing reads the environment afterwards.

pub mod app;
pub mod audit;
pub mod auth;
pub mod backfill;
pub mod cache;
pub mod database;
pub mod logging;
pub mod payment;
pub mod rate_limit;
pub mod storage;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::audit::AuditConfig;
use self::auth::{AuthConfig, MIN_SECRET_LENGTH, PLACEHOLDER_SECRETS};
use self::backfill::BackfillConfig;
use self::cache::CacheConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::payment::PaymentConfig;
use self::rate_limit::RateLimitConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Environment variable prefix, e.g. `BAZAAR_AUTH__ACCESS_SECRET`.
pub const ENV_PREFIX: &str = "BAZAAR";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// configuration (default.toml + environment overlay + env vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name; `"production"` hides error internals.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database provider settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache and counter store settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Per-route-class rate limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Product image storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Payment processor settings.
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Security audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Country backfill settings.
    #[serde(default)]
    pub backfill: BackfillConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml`, the environment-specific overlay
    /// `config/{env}.toml`, and environment variables prefixed with
    /// `BAZAAR_` (sections separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(&["config/default", &format!("config/{env}")], env)
    }

    /// Load configuration from explicit file paths (extension optional).
    pub fn load_from(files: &[&str], env: &str) -> Result<Self, AppError> {
        let mut builder = config::Config::builder().set_default("environment", env)?;
        for file in files {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from a TOML document, without files or env vars.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Check the merged configuration and refuse to start on any problem.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        check_secret("auth.access_secret", &self.auth.access_secret, &mut problems);
        check_secret("auth.refresh_secret", &self.auth.refresh_secret, &mut problems);
        if !self.auth.access_secret.is_empty() && self.auth.access_secret == self.auth.refresh_secret
        {
            problems.push("auth.access_secret and auth.refresh_secret must differ".to_string());
        }
        if !(1..=auth::MAX_ACCESS_TTL_MINUTES).contains(&self.auth.access_ttl_minutes) {
            problems.push(format!(
                "auth.access_ttl_minutes must be between 1 and {}",
                auth::MAX_ACCESS_TTL_MINUTES
            ));
        }
        if !(1..=auth::MAX_REFRESH_TTL_DAYS).contains(&self.auth.refresh_ttl_days) {
            problems.push(format!(
                "auth.refresh_ttl_days must be between 1 and {}",
                auth::MAX_REFRESH_TTL_DAYS
            ));
        }
        if self.auth.password_min_length < 8 {
            problems.push("auth.password_min_length must be at least 8".to_string());
        }
        if self.auth.password_symbols.is_empty() {
            problems.push("auth.password_symbols must not be empty".to_string());
        }

        check_choice("database.provider", &self.database.provider, &["postgres", "memory"], &mut problems);
        check_choice("cache.provider", &self.cache.provider, &["memory", "redis"], &mut problems);
        check_choice("storage.provider", &self.storage.provider, &["local", "s3"], &mut problems);
        check_choice("payment.provider", &self.payment.provider, &["none", "stripe"], &mut problems);
        check_choice("logging.format", &self.logging.format, &["json", "pretty"], &mut problems);

        if self.payment.provider == "stripe" && self.payment.secret_key.is_empty() {
            problems.push("payment.secret_key is required for the stripe provider".to_string());
        }
        if self.storage.provider == "s3" && self.storage.s3.bucket.is_empty() {
            problems.push("storage.s3.bucket is required for the s3 provider".to_string());
        }

        for (name, window) in [
            ("register", self.rate_limit.register),
            ("login", self.rate_limit.login),
            ("api", self.rate_limit.api),
        ] {
            if window.max_requests == 0 || window.window_seconds == 0 {
                problems.push(format!("rate_limit.{name} must have a positive cap and window"));
            }
        }

        if let Err(e) = validate_country_list(&self.backfill.countries) {
            problems.push(e.message);
        }
        if self.backfill.batch_size == 0 {
            problems.push("backfill.batch_size must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Invalid configuration: {}",
                problems.join("; ")
            )))
        }
    }
}

/// A country list must be non-empty and free of duplicates (case-insensitive).
pub fn validate_country_list(countries: &[String]) -> Result<(), AppError> {
    if countries.is_empty() {
        return Err(AppError::configuration("backfill.countries must not be empty"));
    }
    let mut seen = HashSet::new();
    for country in countries {
        let key = country.trim().to_lowercase();
        if key.is_empty() {
            return Err(AppError::configuration(
                "backfill.countries contains a blank entry",
            ));
        }
        if !seen.insert(key) {
            return Err(AppError::configuration(format!(
                "backfill.countries contains duplicate entry '{country}'"
            )));
        }
    }
    Ok(())
}

fn check_secret(name: &str, value: &str, problems: &mut Vec<String>) {
    if value.is_empty() {
        problems.push(format!("{name} is not set"));
    } else if PLACEHOLDER_SECRETS.iter().any(|p| p.eq_ignore_ascii_case(value)) {
        problems.push(format!("{name} is a placeholder value"));
    } else if value.len() < MIN_SECRET_LENGTH {
        problems.push(format!("{name} must be at least {MIN_SECRET_LENGTH} bytes"));
    }
}

fn check_choice(name: &str, value: &str, allowed: &[&str], problems: &mut Vec<String>) {
    if !allowed.contains(&value) {
        problems.push(format!("{name} must be one of {allowed:?}, got '{value}'"));
    }
}

fn default_environment() -> String {
    "development".to_string()
}
