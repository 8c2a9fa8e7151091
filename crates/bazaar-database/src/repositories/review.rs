//! Review repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::review::{CreateReview, Review};

use crate::connection::is_unique_violation;
use crate::store::ReviewStore;

/// One review per (user, product).
pub const REVIEW_CONSTRAINT: &str = "reviews_user_product_key";

/// Repository for product reviews.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn create(&self, data: &CreateReview) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"INSERT INTO reviews (id, rating, comment, user_id, product_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(data.rating)
        .bind(&data.comment)
        .bind(data.user_id)
        .bind(data.product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, REVIEW_CONSTRAINT) {
                AppError::conflict("You have already reviewed this product")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create review", e)
            }
        })
    }

    async fn list_by_product(
        &self,
        product_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Review>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count reviews", e))?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"SELECT * FROM reviews WHERE product_id = $1
               ORDER BY created_at DESC LIMIT $2 OFFSET $3"#,
        )
        .bind(product_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reviews", e))?;

        Ok(PageResponse::new(
            reviews,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
