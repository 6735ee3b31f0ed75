//! Request and result objects for the order flow API.

use serde::{Deserialize, Serialize};

use crate::db_types::{CartItem, GatewayConfirmation, Order, PaymentMethod, PaymentStatus, ShippingAddress};

/// A checkout submission from a signed-in customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Required for gateway orders, ignored for COD.
    #[serde(default)]
    pub gateway_confirmation: Option<GatewayConfirmation>,
}

/// What the reconciler did with a webhook event. Every variant maps to an acknowledgement at
/// the HTTP layer; none of them is an error, because the provider retries on anything else.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// The event moved the order to a terminal status.
    Applied { order: Order },
    /// The order was already terminal. Duplicate delivery, or the losing side of a race.
    #[serde(rename_all = "camelCase")]
    AlreadyProcessed { order_id: i64, payment_status: PaymentStatus },
    /// No order carries this provider order id. Logged loudly and dropped.
    #[serde(rename_all = "camelCase")]
    Orphaned { gateway_order_id: String },
    /// The event parsed but is missing the fields the reconciler needs.
    Invalid { reason: String },
    /// An event type the reconciler does not act on.
    Ignored { event: String },
}
