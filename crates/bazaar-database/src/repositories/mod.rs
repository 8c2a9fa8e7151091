//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod product;
pub mod refresh_token;
pub mod review;
pub mod user;

pub use audit::AuditLogRepository;
pub use product::ProductRepository;
pub use refresh_token::RefreshTokenRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
