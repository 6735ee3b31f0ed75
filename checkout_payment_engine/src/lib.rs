//! # Checkout payment engine
//!
//! The engine is the business core of the checkout payment gateway. It owns the order data
//! model, the payment status state machine, and the reconciliation logic that settles orders
//! against events coming from the payment provider.
//!
//! The main components are:
//! * The [`OrderStore`](traits::OrderStore) trait, which captures everything the engine needs
//!   from a persistence backend, including the atomic conditional status update that makes
//!   settlement exactly-once.
//! * [`SqliteDatabase`](sqlite::SqliteDatabase), the SQLite implementation of the store.
//! * [`OrderFlowApi`](order_flow_api::OrderFlowApi), the high-level API that the server crate
//!   drives. It builds and validates new orders, and applies provider events to existing ones.
//! * [`helpers`], with the HMAC-SHA256 signature routines used to authenticate both webhook
//!   payloads and client-side checkout confirmations.

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod order_flow_api;
pub mod order_objects;
pub mod sqlite;
pub mod traits;

pub use order_flow_api::OrderFlowApi;
pub use sqlite::SqliteDatabase;
pub use traits::{OrderFlowError, OrderStore};
