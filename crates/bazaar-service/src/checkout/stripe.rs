//! Stripe Checkout gateway.
//!
//! Creates a Checkout Session with inline `price_data`, so no products
//! need to exist on the Stripe side.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

use bazaar_core::config::payment::PaymentConfig;
use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::{CheckoutSession, LineItem, PaymentGateway};

/// Stripe API client for hosted checkout.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    endpoint: String,
    currency: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    /// Creates a gateway from the payment settings.
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        if config.secret_key.is_empty() {
            return Err(AppError::configuration(
                "payment.secret_key is required for the stripe provider",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build payment client", e)
            })?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            endpoint: format!("{}/v1/checkout/sessions", config.api_base.trim_end_matches('/')),
            currency: config.currency.to_lowercase(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    /// Form body for `POST /v1/checkout/sessions`.
    fn form_body(&self, items: &[LineItem], customer_reference: Option<&str>) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("mode", "payment")
            .append_pair("success_url", &self.success_url)
            .append_pair("cancel_url", &self.cancel_url);
        if let Some(reference) = customer_reference {
            form.append_pair("client_reference_id", reference);
        }
        for (i, item) in items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.append_pair(&format!("{prefix}[price_data][currency]"), &self.currency)
                .append_pair(&format!("{prefix}[price_data][product_data][name]"), &item.name)
                .append_pair(
                    &format!("{prefix}[price_data][unit_amount]"),
                    &item.unit_amount.to_string(),
                )
                .append_pair(&format!("{prefix}[quantity]"), &item.quantity.to_string());
        }
        form.finish()
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn provider_type(&self) -> &str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        items: &[LineItem],
        customer_reference: Option<&str>,
    ) -> AppResult<CheckoutSession> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.form_body(items, customer_reference))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Payment provider unreachable", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            warn!(status = %status, reason = %reason, "Checkout session rejected");
            return Err(AppError::external_service(format!(
                "Payment provider rejected the checkout: {reason}"
            )));
        }

        let session: SessionResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed payment provider response",
                e,
            )
        })?;
        let url = session.url.ok_or_else(|| {
            AppError::external_service("Payment provider returned no checkout URL")
        })?;

        debug!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    fn gateway(api_base: &str) -> StripeGateway {
        StripeGateway::new(&PaymentConfig {
            provider: "stripe".to_string(),
            secret_key: "sk_test_123".to_string(),
            api_base: api_base.to_string(),
            currency: "USD".to_string(),
            success_url: "https://shop.test/success".to_string(),
            cancel_url: "https://shop.test/cart".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    fn items() -> Vec<LineItem> {
        vec![LineItem {
            name: "Brass lantern & stand".to_string(),
            unit_amount: 2450,
            quantity: 2,
        }]
    }

    /// Serve one HTTP request, answering with `status` and `body`.
    async fn one_shot_server(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        });

        (format!("http://{addr}"), rx)
    }

    #[test]
    fn test_form_body_encodes_line_items() {
        let body = gateway("https://api.stripe.test").form_body(&items(), Some("user-1"));
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("client_reference_id"), Some("user-1"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Brass lantern & stand")
        );
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("2450"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
    }

    #[test]
    fn test_requires_secret_key() {
        let err = StripeGateway::new(&PaymentConfig {
            provider: "stripe".to_string(),
            ..PaymentConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_creates_session() {
        let (base, request) = one_shot_server(
            "200 OK",
            r#"{"id":"cs_test_1","url":"https://checkout.stripe.test/pay/cs_test_1"}"#,
        )
        .await;

        let session = gateway(&base)
            .create_checkout_session(&items(), None)
            .await
            .unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url, "https://checkout.stripe.test/pay/cs_test_1");

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /v1/checkout/sessions"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk_test_123"));
    }

    #[tokio::test]
    async fn test_provider_error_is_external() {
        let (base, _request) = one_shot_server(
            "400 Bad Request",
            r#"{"error":{"message":"Invalid currency"}}"#,
        )
        .await;

        let err = gateway(&base)
            .create_checkout_session(&items(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("Invalid currency"));
    }
}
