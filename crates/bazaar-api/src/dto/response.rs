//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_entity::product::{Product, format_price};
use bazaar_entity::user::User;
use bazaar_service::AuthOutcome;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Registration result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// The new account.
    pub user_id: Uuid,
}

/// Login and refresh result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
    /// User info.
    pub user: UserResponse,
}

impl From<AuthOutcome> for LoginResponse {
    fn from(outcome: AuthOutcome) -> Self {
        Self {
            access_token: outcome.tokens.access_token,
            refresh_token: outcome.tokens.refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_at: outcome.tokens.access_expires_at,
            refresh_expires_at: outcome.tokens.refresh_expires_at,
            user: outcome.user.into(),
        }
    }
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Role.
    pub role: String,
    /// Paid membership.
    pub membership: bool,
    /// Verified professional seller.
    pub pro_seller: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Last login.
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.to_string(),
            membership: user.membership,
            pro_seller: user.pro_seller,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

/// Product as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Decimal price, e.g. `"24.50"`.
    pub price: String,
    /// Price in minor units.
    pub price_cents: i64,
    /// Image URLs.
    pub images: Vec<String>,
    /// Country of origin.
    pub country: Option<String>,
    /// Categories.
    pub categories: Vec<String>,
    /// Units available.
    pub stock: i32,
    /// Owning seller.
    pub seller_id: Uuid,
    /// Listed at.
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            price: format_price(p.price_cents),
            price_cents: p.price_cents,
            title: p.title,
            description: p.description,
            images: p.images,
            country: p.country,
            categories: p.categories,
            stock: p.stock,
            seller_id: p.seller_id,
            created_at: p.created_at,
        }
    }
}

/// Hosted payment page to redirect the buyer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Payment page URL.
    pub redirect_url: String,
    /// Provider session ID.
    pub session_id: String,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Package version.
    pub version: String,
    /// Deployment environment name.
    pub environment: String,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Database provider and state.
    pub database: ComponentHealth,
    /// Cache provider and state.
    pub cache: ComponentHealth,
}

/// One dependency in the health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Provider name.
    pub provider: String,
    /// Whether it answered.
    pub healthy: bool,
}

/// `GET /version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Deployment environment name.
    pub environment: String,
}

/// `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    /// Service display name.
    pub service: String,
    /// Always `operational` while the process answers.
    pub status: String,
    /// Package version.
    pub version: String,
    /// Deployment environment name.
    pub environment: String,
    /// Where the API is documented, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// `GET /metrics/rate-limits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitMetricsResponse {
    /// Master switch.
    pub enabled: bool,
    /// One entry per route class.
    pub classes: Vec<RateLimitClassMetrics>,
}

/// Configured window and live counters of one route class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitClassMetrics {
    /// `register`, `login` or `api`.
    pub class: String,
    /// Requests admitted per window.
    pub limit: u64,
    /// Window length in seconds.
    pub window_seconds: u64,
    /// Clients with an open window, busiest first.
    pub clients: Vec<RateLimitClientMetrics>,
}

/// One client's open window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitClientMetrics {
    /// Client key.
    pub client: String,
    /// Hits counted so far.
    pub count: u64,
    /// Seconds until the window resets, rounded up.
    pub resets_in_seconds: u64,
}

impl From<bazaar_auth::ClassUsage> for RateLimitClassMetrics {
    fn from(usage: bazaar_auth::ClassUsage) -> Self {
        Self {
            class: usage.class.to_string(),
            limit: usage.window.max_requests,
            window_seconds: usage.window.window_seconds,
            clients: usage
                .clients
                .into_iter()
                .map(|c| RateLimitClientMetrics {
                    client: c.client,
                    count: c.count,
                    resets_in_seconds: crate::error::retry_after_seconds(c.resets_in),
                })
                .collect(),
        }
    }
}
