//! Events module for order lifecycle changes
//!
//! A dialogue turn may emit one of these when the order it carries moves
//! forward, gets confirmed, or gets dropped.

use serde::{Deserialize, Serialize};

/// Events emitted by the dialogue engine during transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// User asked to place an order
    OrderStarted,

    /// Product name captured
    ProductChosen { product: String },

    /// Quantity accepted, awaiting confirmation
    QuantitySet { quantity: u32 },

    /// Order confirmed and assigned an id
    OrderConfirmed {
        order_id: String,
        product: String,
        quantity: u32,
    },

    /// Order abandoned before confirmation
    OrderCancelled,
}

impl std::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEvent::OrderStarted => write!(f, "ORDER_STARTED"),
            OrderEvent::ProductChosen { product } => write!(f, "PRODUCT_CHOSEN ({})", product),
            OrderEvent::QuantitySet { quantity } => write!(f, "QUANTITY_SET ({})", quantity),
            OrderEvent::OrderConfirmed {
                order_id,
                product,
                quantity,
            } => write!(f, "ORDER_CONFIRMED #{} ({} x{})", order_id, product, quantity),
            OrderEvent::OrderCancelled => write!(f, "ORDER_CANCELLED"),
        }
    }
}
