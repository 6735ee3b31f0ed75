use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, Order, PaymentStatus};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Invalid cart: {0}")]
    InvalidCart(String),
    #[error("Invalid shipping address: {0}")]
    InvalidAddress(String),
    #[error("Gateway confirmation is missing or incomplete: {0}")]
    InvalidGatewayConfirmation(String),
    #[error("Payment signature verification failed")]
    PaymentVerificationFailed,
    #[error("An order for gateway order id {0} already exists")]
    DuplicateGatewayOrder(String),
    #[error("Order not found")]
    OrderNotFound,
    #[error("Order is already in terminal status {0} and cannot be overridden")]
    OverrideForbidden(PaymentStatus),
    #[error("The payment gateway credentials are not configured")]
    GatewayNotConfigured,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// The outcome of an admin status override. Distinguishing `AlreadyTerminal` from `NotFound`
/// matters at the API surface, where the former is a conflict and the latter a 404.
#[derive(Debug, Clone)]
pub enum StatusOverrideResult {
    Applied(Order),
    AlreadyTerminal(PaymentStatus),
    NotFound,
}

/// The persistence operations the order flow needs.
///
/// `settle_payment` is the linchpin. It must be a single atomic compare-and-set: the status
/// is written if and only if the current status is non-terminal, and the caller learns which
/// way it went from the return value. Two concurrent settlement attempts against the same
/// order must resolve to exactly one `Some` and one `None`.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone + Send + Sync + 'static {
    /// Persists a validated order with its line items. Fails with
    /// [`OrderFlowError::DuplicateGatewayOrder`] when `gateway_order_id` is already taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Fetches an order by its internal id, regardless of owner.
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches an order only if it belongs to `owner_id`. An existing order owned by someone
    /// else comes back as `None`, indistinguishable from a missing one.
    async fn fetch_order_for_user(&self, owner_id: &str, id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// All orders for a user, newest first.
    async fn fetch_orders_for_user(&self, owner_id: &str) -> Result<Vec<Order>, OrderFlowError>;

    /// Looks an order up by the payment provider's order id.
    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, OrderFlowError>;

    /// Atomically moves an order to `new_status` if and only if its current status is
    /// non-terminal. Records `payment_id` (without clobbering one already present) and the
    /// reconciliation timestamp. Returns the updated order when the write landed, `None` when
    /// the guard rejected it.
    async fn settle_payment(
        &self,
        order_id: i64,
        new_status: PaymentStatus,
        payment_id: Option<String>,
        reconciled_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderFlowError>;

    /// An operator-initiated status change. Subject to the same terminal-status guard as
    /// `settle_payment`, but reports why nothing happened instead of folding the cases
    /// together.
    async fn override_status(&self, order_id: i64, new_status: PaymentStatus)
        -> Result<StatusOverrideResult, OrderFlowError>;
}
