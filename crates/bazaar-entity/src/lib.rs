//! # bazaar-entity
//!
//! Domain entity models for the Bazaar marketplace. Every struct in this
//! crate represents a database table row or a domain value object.
//! Database entities derive `sqlx::FromRow`.

pub mod audit;
pub mod product;
pub mod review;
pub mod session;
pub mod user;
