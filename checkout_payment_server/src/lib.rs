//! # Checkout payment server
//!
//! The REST surface over the checkout payment engine. It is responsible for:
//! * Accepting checkout submissions from signed-in customers and handing them to the engine.
//! * Receiving webhook events from the payment provider, verifying their HMAC signature
//!   against the raw request body, and feeding them to the reconciler.
//! * Creating provider-side checkout orders on behalf of the storefront.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config] for the full list.
//!
//! ## Routes
//! * `GET /health`: liveness check.
//! * `POST /api/orders`: place an order (authenticated).
//! * `GET /api/orders`: the caller's order history (authenticated).
//! * `GET /api/orders/{id}`: a single order, owner-scoped (authenticated).
//! * `PUT /api/admin/orders/{id}/status`: operator status override (admin).
//! * `POST /api/checkout/gateway`: create a provider checkout order (authenticated).
//! * `POST /payments/webhook`: the provider's webhook (HMAC-authenticated).

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
