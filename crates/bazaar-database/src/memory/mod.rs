//! In-memory implementations of the store traits.
//!
//! Used for local development and tests. Each store keeps its rows behind
//! a single async `RwLock`, so check-and-insert sequences (email and review
//! uniqueness, refresh token revocation) are atomic within the process.

pub mod audit;
pub mod product;
pub mod refresh_token;
pub mod review;
pub mod user;

pub use audit::MemoryAuditStore;
pub use product::MemoryProductStore;
pub use refresh_token::MemoryRefreshTokenStore;
pub use review::MemoryReviewStore;
pub use user::MemoryUserStore;

use bazaar_core::types::pagination::{PageRequest, PageResponse};
use serde::Serialize;

/// Slice an already-sorted list into a page.
pub(crate) fn paginate<T: Serialize + Clone>(items: &[T], page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let slice = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    PageResponse::new(slice, page.page, page.page_size, total)
}
