//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;
pub mod pagination;

pub use auth::AuthUser;
pub use client::{ClientContext, client_ip};
pub use json::{ApiJson, ApiQuery};
pub use pagination::PaginationParams;
