//! The core data types of the order lifecycle.
//!
//! An [`Order`] moves through the [`PaymentStatus`] state machine:
//!
//! ```text
//!   pending ──> processing ──> completed
//!      │             │
//!      │             └──────── > failed
//!      └── > completed | failed | cancelled
//! ```
//!
//! `completed`, `failed` and `cancelled` are terminal. Once an order reaches a terminal
//! status, nothing short of manual database surgery moves it again; every settlement path in
//! the engine goes through a conditional update that refuses to touch terminal rows.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cpg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

/// How the customer chose to pay for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery. The order ships first and money changes hands at the door.
    Cod,
    /// An online payment captured through the payment provider.
    Gateway,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::Gateway => write!(f, "gateway"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "gateway" => Ok(PaymentMethod::Gateway),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

/// Where an order sits in its payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Freshly created, no settlement attempt seen yet.
    Pending,
    /// Payment is expected but not confirmed. COD orders live here until delivery.
    Processing,
    /// Payment confirmed. Terminal.
    Completed,
    /// Payment definitively failed. Terminal.
    Failed,
    /// The order was cancelled before settlement. Terminal.
    Cancelled,
}

impl PaymentStatus {
    /// Terminal statuses never transition again. The conditional update in the store is the
    /// single enforcement point for this rule; this method exists for fast-path checks and
    /// for reporting.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Cancelled)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

/// A single line of a customer's cart, as submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
}

/// A priced line item attached to a stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    #[serde(rename = "price")]
    pub unit_price: Money,
}

impl OrderItem {
    /// The line total, `quantity * unit_price`.
    pub fn subtotal(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// The delivery address captured with every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

/// The payment provider's confirmation tuple, submitted by the client after a successful
/// checkout flow. The `signature` is an HMAC over `"{order_id}|{payment_id}"` keyed with the
/// gateway API secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// An order as stored in the database, with its line items attached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub owner_id: String,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[sqlx(flatten)]
    pub shipping_address: ShippingAddress,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_settled(&self) -> bool {
        self.payment_status.is_terminal()
    }
}

/// A validated order that has not been persisted yet. Produced by the order builder in
/// [`OrderFlowApi`](crate::order_flow_api::OrderFlowApi), consumed by
/// [`OrderStore::insert_order`](crate::traits::OrderStore::insert_order).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
