//! Request DTOs.
//!
//! Register, login, and review bodies deserialize straight into the
//! service input types.

use serde::Deserialize;
use uuid::Uuid;

use bazaar_service::CartItem;

/// `POST /refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token from the last login or refresh.
    pub refresh_token: String,
}

/// `POST /checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// Products and quantities. Prices are looked up server side.
    pub cart: Vec<CartItem>,
}

/// `PUT /admin/users/{id}/role`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleChangeRequest {
    /// `BUYER`, `SELLER`, or `ADMIN`.
    pub role: String,
}

/// Catalog filters for `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Exact country match.
    pub country: Option<String>,
    /// Listings carrying this category.
    pub category: Option<String>,
}

/// Filters for `GET /admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    /// Only users with this role.
    pub role: Option<String>,
}

/// Filters for `GET /admin/audit`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    /// Only events about this user.
    pub user_id: Option<Uuid>,
    /// Only this event type, e.g. `login.failed`.
    pub event: Option<String>,
}
