//! Core traits defined in `bazaar-core` and implemented by other crates.

pub mod cache;
pub mod payment;
pub mod storage;

pub use cache::{CacheProvider, WindowCount};
pub use payment::{CheckoutSession, LineItem, PaymentGateway};
pub use storage::ObjectStorage;
