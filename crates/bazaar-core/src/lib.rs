//! # bazaar-core
//!
//! Foundation crate for the Bazaar marketplace backend.
//!
//! Provides the unified error type, configuration schema, the traits that
//! sit between the service layer and its infrastructure (cache, object
//! storage, payment processor), and shared pagination types.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
