//! The high-level order flow: building new orders and reconciling provider events.
//!
//! `OrderFlowApi` is generic over the [`OrderStore`] so the server endpoints can be tested
//! against a mock store. All status transitions funnel through the store's conditional
//! update; this module never writes a status unconditionally.

use chrono::{Duration, Utc};
use cpg_common::{Money, Secret};
use log::{debug, error, info, warn};
use rand::Rng;

use crate::db_types::{CartItem, NewOrder, Order, OrderItem, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::events::{GatewayEvent, GatewayEventType};
use crate::helpers::verify_checkout_signature;
use crate::order_objects::{OrderRequest, ReconciliationOutcome};
use crate::traits::{OrderFlowError, OrderStore, StatusOverrideResult};

/// COD deliveries are promised within this window, in whole seconds from checkout.
const DELIVERY_WINDOW_SECS: std::ops::RangeInclusive<i64> = (4 * 86_400)..=(5 * 86_400);

pub struct OrderFlowApi<B> {
    db: B,
    /// The gateway API secret, used to verify client-side checkout confirmations.
    gateway_secret: Secret<String>,
}

impl<B: std::fmt::Debug> std::fmt::Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: OrderStore
{
    pub fn new(db: B, gateway_secret: Secret<String>) -> Self {
        Self { db, gateway_secret }
    }

    /// Validates a checkout submission and persists the resulting order.
    ///
    /// COD orders are accepted on the spot: they start in `processing` with an estimated
    /// delivery date 4 to 5 days out. Gateway orders must arrive with a verified provider
    /// confirmation and start in a tentative `completed`; the webhook remains the
    /// authoritative word on whether the payment actually stuck.
    pub async fn place_order(&self, owner_id: &str, req: OrderRequest) -> Result<Order, OrderFlowError> {
        let items = validate_items(&req.items)?;
        let total_amount = compute_total(&items)?;
        if !total_amount.is_positive() {
            return Err(OrderFlowError::InvalidCart("order total must be positive".to_string()));
        }
        validate_address(&req.shipping_address)?;
        let now = Utc::now();
        let mut order = NewOrder {
            owner_id: owner_id.to_string(),
            items,
            total_amount,
            payment_method: req.payment_method,
            payment_status: PaymentStatus::Pending,
            shipping_address: req.shipping_address,
            gateway_order_id: None,
            gateway_payment_id: None,
            gateway_signature: None,
            estimated_delivery_date: None,
            created_at: now,
        };
        match req.payment_method {
            PaymentMethod::Cod => {
                let eta = rand::thread_rng().gen_range(DELIVERY_WINDOW_SECS);
                order.payment_status = PaymentStatus::Processing;
                order.estimated_delivery_date = Some(now + Duration::seconds(eta));
            },
            PaymentMethod::Gateway => {
                let confirmation = req.gateway_confirmation.as_ref().ok_or_else(|| {
                    OrderFlowError::InvalidGatewayConfirmation("gateway order without confirmation details".to_string())
                })?;
                if confirmation.order_id.is_empty() || confirmation.payment_id.is_empty() || confirmation.signature.is_empty() {
                    return Err(OrderFlowError::InvalidGatewayConfirmation(
                        "orderId, paymentId and signature must all be present".to_string(),
                    ));
                }
                let secret = self.gateway_secret.reveal();
                if secret.is_empty() {
                    error!("🔄️ Cannot verify a checkout confirmation: no gateway secret is configured");
                    return Err(OrderFlowError::GatewayNotConfigured);
                }
                if !verify_checkout_signature(secret, &confirmation.order_id, &confirmation.payment_id, &confirmation.signature) {
                    warn!("🔄️ Rejected checkout for {owner_id}: bad signature on {}", confirmation.order_id);
                    return Err(OrderFlowError::PaymentVerificationFailed);
                }
                order.payment_status = PaymentStatus::Completed;
                order.gateway_order_id = Some(confirmation.order_id.clone());
                order.gateway_payment_id = Some(confirmation.payment_id.clone());
                order.gateway_signature = Some(confirmation.signature.clone());
            },
        }
        let order = self.db.insert_order(order).await?;
        info!(
            "🔄️ Order {} placed by {} for {} ({}, {})",
            order.id, order.owner_id, order.total_amount, order.payment_method, order.payment_status
        );
        Ok(order)
    }

    /// Applies a verified webhook event to the matching order.
    ///
    /// The caller has already authenticated the payload; by the time an event reaches this
    /// method it is trusted, but it may still be a duplicate, refer to an order we never
    /// created, or be a type we do not act on. None of those is an error. Only a storage
    /// failure propagates as `Err`, which is the one case the provider should retry.
    pub async fn handle_gateway_event(&self, event: GatewayEvent) -> Result<ReconciliationOutcome, OrderFlowError> {
        let target = match event.event_type() {
            GatewayEventType::Captured => PaymentStatus::Completed,
            GatewayEventType::Failed => PaymentStatus::Failed,
            GatewayEventType::Other => {
                debug!("🔄️ Ignoring gateway event '{}'", event.event);
                return Ok(ReconciliationOutcome::Ignored { event: event.event });
            },
        };
        let Some(entity) = event.payment_entity() else {
            warn!("🔄️ Event '{}' arrived without a payment entity", event.event);
            return Ok(ReconciliationOutcome::Invalid { reason: "no payment entity in payload".to_string() });
        };
        let Some(gateway_order_id) = entity.order_id.as_deref() else {
            warn!("🔄️ Event '{}' arrived without an order id", event.event);
            return Ok(ReconciliationOutcome::Invalid { reason: "no order_id in payment entity".to_string() });
        };
        // A captured event whose entity disagrees with the event name is malformed.
        if target == PaymentStatus::Completed && entity.status.as_deref() != Some("captured") {
            warn!("🔄️ Captured event for {gateway_order_id} carries entity status {:?}", entity.status);
            return Ok(ReconciliationOutcome::Invalid {
                reason: format!("entity status {:?} does not match a captured event", entity.status),
            });
        }
        let payment_id = entity.id.clone();
        let Some(order) = self.db.fetch_order_by_gateway_order_id(gateway_order_id).await? else {
            error!("🔄️ Orphaned '{}' event for unknown gateway order {gateway_order_id}", event.event);
            return Ok(ReconciliationOutcome::Orphaned { gateway_order_id: gateway_order_id.to_string() });
        };
        match self.db.settle_payment(order.id, target, payment_id, Utc::now()).await? {
            Some(updated) => {
                info!("🔄️ Order {} reconciled to {} by '{}' event", updated.id, target, event.event);
                Ok(ReconciliationOutcome::Applied { order: updated })
            },
            None => {
                // The guard turned the write away. Either a duplicate delivery, or another
                // settlement path got there first. Re-read for the settled status, since the
                // first fetch may predate the race.
                let status = self
                    .db
                    .fetch_order_by_id(order.id)
                    .await?
                    .map(|o| o.payment_status)
                    .unwrap_or(order.payment_status);
                info!("🔄️ Order {} already settled as {status}; '{}' event is a no-op", order.id, event.event);
                Ok(ReconciliationOutcome::AlreadyProcessed { order_id: order.id, payment_status: status })
            },
        }
    }

    pub async fn orders_for_user(&self, owner_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(owner_id).await
    }

    /// An order scoped to its owner. Someone else's order is reported as missing.
    pub async fn order_for_user(&self, owner_id: &str, id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_for_user(owner_id, id).await?.ok_or(OrderFlowError::OrderNotFound)
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_id(id).await?.ok_or(OrderFlowError::OrderNotFound)
    }

    /// An operator-initiated status change. Terminal orders stay put.
    pub async fn override_order_status(&self, id: i64, new_status: PaymentStatus) -> Result<Order, OrderFlowError> {
        match self.db.override_status(id, new_status).await? {
            StatusOverrideResult::Applied(order) => {
                info!("🔄️ Order {} status overridden to {new_status}", order.id);
                Ok(order)
            },
            StatusOverrideResult::AlreadyTerminal(status) => {
                warn!("🔄️ Refused override on order {id}: already {status}");
                Err(OrderFlowError::OverrideForbidden(status))
            },
            StatusOverrideResult::NotFound => Err(OrderFlowError::OrderNotFound),
        }
    }
}

fn validate_items(items: &[CartItem]) -> Result<Vec<OrderItem>, OrderFlowError> {
    if items.is_empty() {
        return Err(OrderFlowError::InvalidCart("cart is empty".to_string()));
    }
    items
        .iter()
        .map(|item| {
            if item.id.trim().is_empty() || item.name.trim().is_empty() {
                return Err(OrderFlowError::InvalidCart("cart item is missing an id or name".to_string()));
            }
            if item.quantity <= 0 {
                return Err(OrderFlowError::InvalidCart(format!(
                    "invalid quantity {} for item {}",
                    item.quantity, item.id
                )));
            }
            if !item.price.is_positive() {
                return Err(OrderFlowError::InvalidCart(format!("invalid price {} for item {}", item.price, item.id)));
            }
            Ok(OrderItem {
                product_id: item.id.clone(),
                product_name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.price,
            })
        })
        .collect()
}

fn compute_total(items: &[OrderItem]) -> Result<Money, OrderFlowError> {
    items.iter().try_fold(Money::default(), |acc, item| {
        item.unit_price
            .checked_mul(item.quantity)
            .and_then(|subtotal| acc.checked_add(subtotal))
            .ok_or_else(|| {
                OrderFlowError::InvalidCart(format!("order total overflows for item {}", item.product_id))
            })
    })
}

fn validate_address(address: &ShippingAddress) -> Result<(), OrderFlowError> {
    let required = [
        ("line1", &address.line1),
        ("city", &address.city),
        ("state", &address.state),
        ("postalCode", &address.postal_code),
        ("country", &address.country),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrderFlowError::InvalidAddress(format!("{field} is required")));
        }
    }
    Ok(())
}
