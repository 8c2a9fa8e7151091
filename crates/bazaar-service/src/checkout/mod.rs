//! Checkout against a hosted payment page.

pub mod disabled;
pub mod service;
pub mod stripe;

use std::sync::Arc;

use tracing::info;

use bazaar_core::config::payment::PaymentConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::PaymentGateway;

pub use disabled::DisabledGateway;
pub use service::{CartItem, CheckoutService};
pub use stripe::StripeGateway;

/// Build the configured payment gateway.
pub fn build_gateway(config: &PaymentConfig) -> AppResult<Arc<dyn PaymentGateway>> {
    match config.provider.as_str() {
        "stripe" => {
            info!(api_base = %config.api_base, currency = %config.currency, "Using Stripe checkout");
            Ok(Arc::new(StripeGateway::new(config)?))
        }
        "none" => {
            info!("Payments disabled");
            Ok(Arc::new(DisabledGateway))
        }
        other => Err(AppError::configuration(format!(
            "Unknown payment provider: '{other}'. Supported: stripe, none"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_gateway() {
        let none = build_gateway(&PaymentConfig::default()).unwrap();
        assert_eq!(none.provider_type(), "none");

        let stripe = build_gateway(&PaymentConfig {
            provider: "stripe".to_string(),
            secret_key: "sk_test_123".to_string(),
            ..PaymentConfig::default()
        })
        .unwrap();
        assert_eq!(stripe.provider_type(), "stripe");

        let other = PaymentConfig {
            provider: "paypal".to_string(),
            ..PaymentConfig::default()
        };
        assert!(build_gateway(&other).is_err());
    }
}
