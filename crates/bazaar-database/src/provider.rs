//! Database provider selection.
//!
//! Mirrors the cache manager: configuration names a provider and this
//! module wires one implementation of every store trait behind `Arc<dyn _>`.

use std::sync::Arc;

use tracing::info;

use bazaar_core::config::database::DatabaseConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{
    MemoryAuditStore, MemoryProductStore, MemoryRefreshTokenStore, MemoryReviewStore,
    MemoryUserStore,
};
use crate::migration::run_migrations;
use crate::repositories::{
    AuditLogRepository, ProductRepository, RefreshTokenRepository, ReviewRepository,
    UserRepository,
};
use crate::store::{AuditStore, ProductStore, RefreshTokenStore, ReviewStore, UserStore};

/// One implementation of each store, plus the pool when backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct Database {
    /// Users.
    pub users: Arc<dyn UserStore>,
    /// Product catalog.
    pub products: Arc<dyn ProductStore>,
    /// Reviews.
    pub reviews: Arc<dyn ReviewStore>,
    /// Audit log.
    pub audit: Arc<dyn AuditStore>,
    /// Refresh tokens.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pool: Option<DatabasePool>,
}

impl Database {
    /// Build the configured provider.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Using in-memory database provider");
                Ok(Self::in_memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: {other}"
            ))),
        }
    }

    /// Repositories over an existing pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pg.clone())),
            products: Arc::new(ProductRepository::new(pg.clone())),
            reviews: Arc::new(ReviewRepository::new(pg.clone())),
            audit: Arc::new(AuditLogRepository::new(pg.clone())),
            refresh_tokens: Arc::new(RefreshTokenRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            products: Arc::new(MemoryProductStore::new()),
            reviews: Arc::new(MemoryReviewStore::new()),
            audit: Arc::new(MemoryAuditStore::new()),
            refresh_tokens: Arc::new(MemoryRefreshTokenStore::new()),
            pool: None,
        }
    }

    /// `"postgres"` or `"memory"`.
    pub fn provider_type(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// The PostgreSQL pool, if any.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Ping the backing database.
    pub async fn health_check(&self) -> AppResult<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        if pool.health_check().await? {
            Ok(())
        } else {
            Err(AppError::database("Database health check failed"))
        }
    }

    /// Close the pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
