//! # bazaar-storage
//!
//! Object storage for product images. The local filesystem provider is
//! always available; the S3 provider is behind the `s3` feature.

pub mod manager;
pub mod providers;

pub use manager::build_storage;
pub use providers::LocalStorageProvider;
