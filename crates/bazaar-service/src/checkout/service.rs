//! Checkout service: prices a cart from the catalog and opens a payment page.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::{CheckoutSession, LineItem, PaymentGateway};
use bazaar_database::store::ProductStore;

use crate::context::RequestContext;

/// Largest quantity of one product per checkout.
pub const MAX_QUANTITY: u32 = 99;
/// Most distinct products per checkout.
pub const MAX_LINES: usize = 50;

/// One cart line as sent by the client. Any price the client sends is ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product to buy.
    pub product_id: Uuid,
    /// Units to buy.
    pub quantity: u32,
}

/// Turns carts into hosted checkout sessions.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    products: Arc<dyn ProductStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(products: Arc<dyn ProductStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { products, gateway }
    }

    /// Active payment provider.
    pub fn provider_type(&self) -> &str {
        self.gateway.provider_type()
    }

    /// Price `cart` from the catalog and create a checkout session.
    pub async fn checkout(
        &self,
        customer: Option<&RequestContext>,
        cart: &[CartItem],
    ) -> AppResult<CheckoutSession> {
        let lines = merge_lines(cart)?;

        let ids: Vec<Uuid> = lines.iter().map(|(id, _)| *id).collect();
        let products: HashMap<Uuid, _> = self
            .products
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut items = Vec::with_capacity(lines.len());
        for (product_id, quantity) in lines {
            let product = products
                .get(&product_id)
                .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))?;
            let in_stock = u32::try_from(product.stock).unwrap_or(0);
            if quantity > in_stock {
                return Err(AppError::validation_field(
                    "cart",
                    format!("Only {in_stock} of '{}' in stock", product.title),
                ));
            }
            items.push(LineItem {
                name: product.title.clone(),
                unit_amount: product.price_cents,
                quantity,
            });
        }

        let reference = customer.map(|ctx| ctx.user_id.to_string());
        let session = self
            .gateway
            .create_checkout_session(&items, reference.as_deref())
            .await?;

        let total: i64 = items
            .iter()
            .map(|i| i.unit_amount * i64::from(i.quantity))
            .sum();
        info!(
            session_id = %session.id,
            lines = items.len(),
            total_minor_units = total,
            provider = self.gateway.provider_type(),
            "Checkout session created"
        );
        Ok(session)
    }
}

/// Validate quantities and fold repeated products into one line, keeping
/// first-seen order.
fn merge_lines(cart: &[CartItem]) -> AppResult<Vec<(Uuid, u32)>> {
    if cart.is_empty() {
        return Err(AppError::validation_field("cart", "Cart must not be empty"));
    }

    let mut lines: Vec<(Uuid, u32)> = Vec::new();
    for item in cart {
        if item.quantity == 0 || item.quantity > MAX_QUANTITY {
            return Err(AppError::validation_field(
                "cart",
                format!("Quantity must be between 1 and {MAX_QUANTITY}"),
            ));
        }
        match lines.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
            None => lines.push((item.product_id, item.quantity)),
        }
    }

    if lines.iter().any(|(_, quantity)| *quantity > MAX_QUANTITY) {
        return Err(AppError::validation_field(
            "cart",
            format!("Quantity must be between 1 and {MAX_QUANTITY}"),
        ));
    }
    if lines.len() > MAX_LINES {
        return Err(AppError::validation_field(
            "cart",
            format!("A cart holds at most {MAX_LINES} products"),
        ));
    }
    Ok(lines)
}
