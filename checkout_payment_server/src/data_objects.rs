//! Wire types that only exist at the HTTP boundary.

use checkout_payment_engine::db_types::{Order, PaymentStatus};
use cpg_common::Money;
use serde::{Deserialize, Serialize};

/// The caller's order history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub total_orders: usize,
    pub orders: Vec<Order>,
}

impl From<Vec<Order>> for OrderHistory {
    fn from(orders: Vec<Order>) -> Self {
        Self { total_orders: orders.len(), orders }
    }
}

/// Body of the admin status override.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PaymentStatus,
}

/// Body of `POST /api/checkout/gateway`: the amount the client is about to pay.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub amount: Money,
}

/// What the storefront needs to open the provider's checkout widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub gateway_order_id: String,
    pub amount: Money,
    pub currency: String,
    pub key_id: String,
}
