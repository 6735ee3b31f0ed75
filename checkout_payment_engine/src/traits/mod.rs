//! The persistence contract the engine is written against.
//!
//! Backends implement [`OrderStore`]; everything above the store (the order flow API and the
//! server) only ever talks to the trait, which is what lets the endpoint tests run against a
//! mock instead of a live database.

mod order_store;

pub use order_store::{OrderFlowError, OrderStore, StatusOverrideResult};
