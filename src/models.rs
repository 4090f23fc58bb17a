use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Models
// ============================================================================

/// Persistent order record, keyed by its business order number.
///
/// `notified` only ever transitions false → true; it marks that a shipping
/// event has been emitted for this order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub customer_email: String,
    pub notified: bool,
}

impl Order {
    pub fn new(order_number: &str, customer_email: &str, notified: bool) -> Self {
        Self {
            order_number: order_number.to_string(),
            customer_email: customer_email.to_string(),
            notified,
        }
    }
}

// ============================================================================
// Wire Events
// These are the two queue message schemas; both serialize camelCase.
// ============================================================================

/// Inbound confirmation event consumed from the order-confirmed queue.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmedEvent {
    pub order_number: String,
}

/// Outbound shipping payload. Declaration order is the wire field order:
/// `orderNumber` first, then `customerEmail`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_number: String,
    pub customer_email: String,
}

impl OrderDto {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_number: order.order_number.clone(),
            customer_email: order.customer_email.clone(),
        }
    }
}
