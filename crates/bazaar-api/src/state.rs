//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use bazaar_auth::{FixedWindowLimiter, SessionManager};
use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::PaymentGateway;
use bazaar_core::traits::storage::ObjectStorage;
use bazaar_database::Database;
use bazaar_service::{
    AdminUserService, AuditWriter, AuthService, CheckoutService, ProductService, ReviewService,
    UserService,
};

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Config ───────────────────────────────────────────
    /// Loaded configuration.
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────
    /// Store bundle (PostgreSQL or in-memory).
    pub db: Database,
    /// Shared cache: rate-limit counters, lockouts, token denylist.
    pub cache: CacheManager,
    /// Product image storage.
    pub storage: Arc<dyn ObjectStorage>,

    // ── Auth ─────────────────────────────────────────────
    /// Per-route-class request limiter.
    pub limiter: FixedWindowLimiter,

    // ── Services ─────────────────────────────────────────
    /// Registration, login, and token lifecycle.
    pub auth: AuthService,
    /// Profile reads.
    pub users: UserService,
    /// Role management.
    pub admin: AdminUserService,
    /// Catalog and seller listings.
    pub products: ProductService,
    /// Product reviews.
    pub reviews: ReviewService,
    /// Cart pricing and payment sessions.
    pub checkout: CheckoutService,
    /// Security event log.
    pub audit: AuditWriter,
}

impl AppState {
    /// Wire every service over already-built infrastructure.
    pub fn build(
        config: AppConfig,
        db: Database,
        cache: CacheManager,
        storage: Arc<dyn ObjectStorage>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> AppResult<Self> {
        let audit = AuditWriter::new(db.audit.clone(), &config.audit)?;
        let sessions = SessionManager::new(
            &config.auth,
            cache.clone(),
            db.users.clone(),
            db.refresh_tokens.clone(),
        );
        let auth = AuthService::new(
            &config.auth,
            db.users.clone(),
            sessions.clone(),
            cache.clone(),
            audit.clone(),
        )?;
        let limiter = FixedWindowLimiter::new(cache.clone(), config.rate_limit.clone());

        Ok(Self {
            users: UserService::new(db.users.clone()),
            admin: AdminUserService::new(db.users.clone(), sessions, audit.clone()),
            products: ProductService::new(
                db.products.clone(),
                db.users.clone(),
                storage.clone(),
                &config.storage,
            ),
            reviews: ReviewService::new(db.reviews.clone(), db.products.clone()),
            checkout: CheckoutService::new(db.products.clone(), gateway),
            config: Arc::new(config),
            db,
            cache,
            storage,
            limiter,
            auth,
            audit,
        })
    }
}
