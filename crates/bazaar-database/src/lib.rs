//! # bazaar-database
//!
//! Persistence for Bazaar. The service layer talks to the store traits in
//! [`store`]; [`Database`] bundles one implementation of each, backed
//! either by PostgreSQL ([`repositories`]) or by process memory
//! ([`memory`]) for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use provider::Database;
pub use store::{AuditStore, ProductStore, RefreshTokenStore, ReviewStore, UserStore};
