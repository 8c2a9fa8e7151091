//! # bazaar-service
//!
//! Business logic service layer for Bazaar. Each service orchestrates the
//! stores, cache, object storage, payment gateway, and authentication
//! primitives to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time as `Arc` trait objects or cheap clones.

pub mod audit;
pub mod auth;
pub mod checkout;
pub mod context;
pub mod maintenance;
pub mod product;
pub mod review;
pub mod user;

pub use audit::AuditWriter;
pub use auth::{AuthOutcome, AuthService, LoginInput, RegisterInput};
pub use checkout::{CartItem, CheckoutService, build_gateway};
pub use context::RequestContext;
pub use maintenance::{BackfillReport, CountryBackfill};
pub use product::{ImageUpload, NewListing, ProductService};
pub use review::{NewReview, ReviewService};
pub use user::{AdminUserService, UserService};
