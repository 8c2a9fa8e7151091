//! Review entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i32 = 5;

/// A buyer's review of a product. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review identifier.
    pub id: Uuid,
    /// Star rating in `[1, 5]`.
    pub rating: i32,
    /// Free-text comment.
    pub comment: String,
    /// Reviewing buyer.
    pub user_id: Uuid,
    /// Reviewed product.
    pub product_id: Uuid,
    /// When the review was written.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    /// Star rating.
    pub rating: i32,
    /// Free-text comment.
    pub comment: String,
    /// Reviewing buyer.
    pub user_id: Uuid,
    /// Reviewed product.
    pub product_id: Uuid,
}
