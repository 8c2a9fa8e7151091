//! Gateway used when no payment provider is configured.

use async_trait::async_trait;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::{CheckoutSession, LineItem, PaymentGateway};

/// Refuses every checkout with 503.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    fn provider_type(&self) -> &str {
        "none"
    }

    async fn create_checkout_session(
        &self,
        _items: &[LineItem],
        _customer_reference: Option<&str>,
    ) -> AppResult<CheckoutSession> {
        Err(AppError::service_unavailable("Payments are not configured"))
    }
}
