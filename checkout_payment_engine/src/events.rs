//! Webhook event payloads as the payment provider delivers them.
//!
//! The provider posts a JSON document like
//!
//! ```json
//! {
//!   "event": "payment.captured",
//!   "payload": {
//!     "payment": {
//!       "entity": { "order_id": "order_abc", "id": "pay_xyz", "status": "captured" }
//!     }
//!   }
//! }
//! ```
//!
//! Only the fields the reconciler needs are modelled; everything else in the document is
//! ignored. Unknown event names deserialize fine and are classified as
//! [`GatewayEventType::Other`].

use serde::Deserialize;

/// The event names the reconciler acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventType {
    /// `payment.captured`. The authoritative signal that money has moved.
    Captured,
    /// `payment.failed`. The payment attempt is dead.
    Failed,
    /// Anything else. Acknowledged and discarded.
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEvent {
    pub event: String,
    #[serde(default)]
    pub payload: GatewayEventPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayEventPayload {
    #[serde(default)]
    pub payment: Option<GatewayPaymentPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPaymentPayload {
    pub entity: Option<PaymentEntity>,
}

/// The payment entity embedded in the event payload. All fields are optional because the
/// provider documents them as such; the reconciler decides which ones it cannot do without.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    /// The provider-side order id, matched against `orders.gateway_order_id`.
    pub order_id: Option<String>,
    /// The provider-side payment id.
    pub id: Option<String>,
    pub status: Option<String>,
}

impl GatewayEvent {
    pub fn event_type(&self) -> GatewayEventType {
        match self.event.as_str() {
            "payment.captured" => GatewayEventType::Captured,
            "payment.failed" => GatewayEventType::Failed,
            _ => GatewayEventType::Other,
        }
    }

    pub fn payment_entity(&self) -> Option<&PaymentEntity> {
        self.payload.payment.as_ref().and_then(|p| p.entity.as_ref())
    }
}
