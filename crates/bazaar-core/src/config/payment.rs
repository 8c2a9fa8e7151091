//! Payment processor configuration.

use serde::{Deserialize, Serialize};

/// Hosted checkout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Payment provider: `"stripe"` or `"none"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider secret API key.
    #[serde(default)]
    pub secret_key: String,
    /// Provider API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// ISO 4217 currency code for line items.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Redirect target after a successful payment.
    #[serde(default = "default_success_url")]
    pub success_url: String,
    /// Redirect target after a cancelled payment.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
    /// Outbound request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            secret_key: String::new(),
            api_base: default_api_base(),
            currency: default_currency(),
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    "none".to_string()
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_success_url() -> String {
    "http://localhost:3000/success".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:3000/cart".to_string()
}

fn default_timeout() -> u64 {
    10
}
