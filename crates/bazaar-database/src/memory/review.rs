//! In-memory review store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::review::{CreateReview, Review};

use super::paginate;
use crate::store::ReviewStore;

/// Process-local review store, one review per user and product.
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    inner: RwLock<Vec<Review>>,
}

impl MemoryReviewStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn create(&self, data: &CreateReview) -> AppResult<Review> {
        let mut reviews = self.inner.write().await;
        if reviews
            .iter()
            .any(|r| r.user_id == data.user_id && r.product_id == data.product_id)
        {
            return Err(AppError::conflict("You have already reviewed this product"));
        }

        let review = Review {
            id: Uuid::now_v7(),
            rating: data.rating,
            comment: data.comment.clone(),
            user_id: data.user_id,
            product_id: data.product_id,
            created_at: Utc::now(),
        };
        reviews.push(review.clone());
        Ok(review)
    }

    async fn list_by_product(
        &self,
        product_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Review>> {
        let reviews = self.inner.read().await;
        let matching: Vec<Review> = reviews
            .iter()
            .rev()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        Ok(paginate(&matching, page))
    }
}
