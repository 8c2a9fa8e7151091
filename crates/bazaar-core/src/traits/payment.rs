//! Hosted checkout interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// One line of a checkout, priced in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name shown on the payment page.
    pub name: String,
    /// Unit price in minor units (cents).
    pub unit_amount: i64,
    /// Number of units.
    pub quantity: u32,
}

/// A checkout session created by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Opaque processor session id.
    pub id: String,
    /// URL the client is redirected to.
    pub url: String,
}

/// Payment processor boundary.
#[async_trait]
pub trait PaymentGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Provider identifier.
    fn provider_type(&self) -> &str;

    /// Create a hosted checkout for `items` and return where to send the buyer.
    async fn create_checkout_session(
        &self,
        items: &[LineItem],
        customer_reference: Option<&str>,
    ) -> AppResult<CheckoutSession>;
}
