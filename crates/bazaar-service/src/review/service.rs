//! Review service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bazaar_core::error::{AppError, FieldErrors};
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_database::store::{ProductStore, ReviewStore};
use bazaar_entity::review::model::{MAX_RATING, MIN_RATING};
use bazaar_entity::review::{CreateReview, Review};
use bazaar_entity::user::UserRole;

use crate::context::RequestContext;

const MAX_COMMENT_LEN: usize = 2000;

/// Review form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Stars, 1 to 5.
    pub rating: i32,
    /// Free text.
    pub comment: String,
}

/// Reading and writing product reviews.
#[derive(Debug, Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
    products: Arc<dyn ProductStore>,
}

impl ReviewService {
    /// Creates a new review service.
    pub fn new(reviews: Arc<dyn ReviewStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { reviews, products }
    }

    /// Reviews of one product, newest first.
    pub async fn list(&self, product_id: Uuid, page: &PageRequest) -> AppResult<PageResponse<Review>> {
        self.ensure_product(product_id).await?;
        self.reviews.list_by_product(product_id, page).await
    }

    /// Post a review. Buyers only, once per product.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        product_id: Uuid,
        input: NewReview,
    ) -> AppResult<Review> {
        ctx.require_role(&[UserRole::Buyer])?;

        let comment = input.comment.trim().to_string();
        let mut fields = FieldErrors::new();
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            fields.insert(
                "rating".to_string(),
                vec![format!("Rating must be between {MIN_RATING} and {MAX_RATING}")],
            );
        }
        if comment.is_empty() {
            fields.insert("comment".to_string(), vec!["Comment is required".to_string()]);
        } else if comment.chars().count() > MAX_COMMENT_LEN {
            fields.insert(
                "comment".to_string(),
                vec![format!("Comment must be at most {MAX_COMMENT_LEN} characters")],
            );
        }
        if !fields.is_empty() {
            return Err(AppError::validation_fields(fields));
        }

        self.ensure_product(product_id).await?;
        let review = self
            .reviews
            .create(&CreateReview {
                rating: input.rating,
                comment,
                user_id: ctx.user_id,
                product_id,
            })
            .await?;
        info!(review_id = %review.id, product_id = %product_id, "Review posted");
        Ok(review)
    }

    async fn ensure_product(&self, product_id: Uuid) -> AppResult<()> {
        match self.products.find_by_id(product_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("Product not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use bazaar_auth::BindingContext;
    use bazaar_core::error::ErrorKind;
    use bazaar_database::Database;
    use bazaar_entity::product::CreateProduct;
    use chrono::Utc;

    use super::*;

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role,
            client: BindingContext::new("127.0.0.1", None),
            request_time: Utc::now(),
        }
    }

    async fn setup() -> (ReviewService, Uuid) {
        let db = Database::in_memory();
        let product = db
            .products
            .create(&CreateProduct {
                seller_id: Uuid::new_v4(),
                title: "Rug".to_string(),
                description: "Wool".to_string(),
                price_cents: 12_000,
                images: vec![],
                country: "Tunisia".to_string(),
                categories: vec![],
                stock: 2,
            })
            .await
            .unwrap();
        (ReviewService::new(db.reviews.clone(), db.products.clone()), product.id)
    }

    fn review(rating: i32, comment: &str) -> NewReview {
        NewReview {
            rating,
            comment: comment.to_string(),
        }
    }

    #[tokio::test]
    async fn test_buyer_reviews_once() {
        let (service, product_id) = setup().await;
        let buyer = ctx(UserRole::Buyer);

        service.create(&buyer, product_id, review(5, "Lovely")).await.unwrap();
        let err = service
            .create(&buyer, product_id, review(4, "Again"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let page = service.list(product_id, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].rating, 5);
    }

    #[tokio::test]
    async fn test_rejects_sellers_and_bad_input() {
        let (service, product_id) = setup().await;
        let err = service
            .create(&ctx(UserRole::Seller), product_id, review(5, "Mine is best"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = service
            .create(&ctx(UserRole::Buyer), product_id, review(6, "  "))
            .await
            .unwrap_err();
        let fields = &err.details.unwrap()["fields"];
        assert!(fields["rating"].is_array());
        assert!(fields["comment"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (service, _) = setup().await;
        let err = service
            .create(&ctx(UserRole::Buyer), Uuid::new_v4(), review(3, "Where?"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = service
            .list(Uuid::new_v4(), &PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
