//! Core type definitions used across the Bazaar workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
