//! Product entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A product listed by a seller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: Uuid,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    /// Image URLs in display order.
    pub images: Vec<String>,
    /// Country of origin. `None` only for rows predating the requirement.
    pub country: Option<String>,
    /// Category labels, deduplicated.
    pub categories: Vec<String>,
    /// Units available.
    pub stock: i32,
    /// Owning seller.
    pub seller_id: Uuid,
    /// When the product was listed.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether `user_id` owns this listing.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.seller_id == user_id
    }

    /// Whether the country still needs to be backfilled.
    pub fn is_missing_country(&self) -> bool {
        self.country
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
    }
}

/// Data required to create a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    /// Owning seller.
    pub seller_id: Uuid,
    /// Listing title.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    /// Uploaded image URLs.
    pub images: Vec<String>,
    /// Country of origin.
    pub country: String,
    /// Category labels.
    pub categories: Vec<String>,
    /// Units available.
    pub stock: i32,
}

/// Optional filters for catalog listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact country match (case-insensitive).
    pub country: Option<String>,
    /// Products carrying this category (case-insensitive).
    pub category: Option<String>,
    /// Products owned by this seller.
    pub seller_id: Option<Uuid>,
}

impl ProductFilter {
    /// Check a product against the filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(country) = &self.country {
            let same = product
                .country
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(country));
            if !same {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !product
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        self.seller_id.is_none_or(|id| product.seller_id == id)
    }
}
