//! # bazaar-cache
//!
//! Cache and shared counter store for Bazaar. Two providers:
//!
//! - **memory**: in-process, using [moka](https://crates.io/crates/moka)
//!   for values, and `DashMap`s for security state that must not be
//!   evicted and for fixed-window counters
//! - **redis**: Redis-backed, with an atomic Lua script for counters
//!
//! The provider is selected at runtime based on configuration. Rate
//! limits only hold across instances with the Redis provider.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
