//! Store traits consumed by the service layer.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory one in [`crate::memory`]. Both enforce the same
//! uniqueness rules and report violations as `ErrorKind::Conflict`.

use std::fmt::Debug;

use async_trait::async_trait;
use uuid::Uuid;

use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use bazaar_entity::product::{CreateProduct, Product, ProductFilter};
use bazaar_entity::review::{CreateReview, Review};
use bazaar_entity::session::{CreateRefreshToken, RefreshTokenRecord};
use bazaar_entity::user::{CreateUser, User, UserRole};

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync + Debug + 'static {
    /// Insert a user. A duplicate email is a conflict, whatever the caller
    /// checked beforehand.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users, newest first, optionally restricted to one role.
    async fn list(&self, role: Option<UserRole>, page: &PageRequest)
    -> AppResult<PageResponse<User>>;

    /// Stamp `last_login` with the current time.
    async fn update_last_login(&self, id: Uuid) -> AppResult<()>;

    /// Change a user's role.
    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;
}

/// Product catalog store.
#[async_trait]
pub trait ProductStore: Send + Sync + Debug + 'static {
    /// Insert a product.
    async fn create(&self, data: &CreateProduct) -> AppResult<Product>;

    /// Find a product by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Fetch every product whose id is in `ids`, in no particular order.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    /// List products, newest first.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Product>>;

    /// Delete a product. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Ids of products whose country is null or blank, oldest first.
    async fn find_missing_country(&self) -> AppResult<Vec<Uuid>>;

    /// Set countries for a batch in one transaction. Returns rows updated.
    ///
    /// Either every assignment is applied or none is.
    async fn assign_countries(&self, assignments: &[(Uuid, String)]) -> AppResult<u64>;
}

/// Review store.
#[async_trait]
pub trait ReviewStore: Send + Sync + Debug + 'static {
    /// Insert a review. A second review of the same product by the same
    /// user is a conflict.
    async fn create(&self, data: &CreateReview) -> AppResult<Review>;

    /// List a product's reviews, newest first.
    async fn list_by_product(
        &self,
        product_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Review>>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditStore: Send + Sync + Debug + 'static {
    /// Append an entry.
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// List entries, newest first.
    async fn list(
        &self,
        user_id: Option<Uuid>,
        event_type: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

/// Persisted refresh tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + Debug + 'static {
    /// Record a newly issued refresh token.
    async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// Find a record by `jti`.
    async fn find(&self, jti: Uuid) -> AppResult<Option<RefreshTokenRecord>>;

    /// Revoke one token. Returns `true` only for the caller that flipped it
    /// from active to revoked, so concurrent rotations cannot both win.
    async fn revoke(&self, jti: Uuid) -> AppResult<bool>;

    /// Revoke every active token of a login session.
    async fn revoke_session(&self, session_id: Uuid) -> AppResult<u64>;

    /// Revoke every active token of a user.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Sessions of a user that still hold an unexpired refresh token,
    /// revoked or not.
    async fn session_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;
}
