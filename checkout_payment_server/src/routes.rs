//! Authenticated API routes.
//!
//! Handlers are generic over the [`OrderStore`] backing the [`OrderFlowApi`], so the
//! endpoint tests can drive them against a mock store. The live wiring in
//! [`server`](crate::server) instantiates them with [`SqliteDatabase`](checkout_payment_engine::SqliteDatabase).

use actix_web::{get, web, HttpResponse, Responder};
use checkout_payment_engine::{order_objects::OrderRequest, OrderFlowApi, OrderStore};
use log::{debug, info};

use crate::{
    auth::JwtClaims,
    data_objects::{CheckoutRequest, CheckoutResponse, OrderHistory, UpdateStatusRequest},
    errors::ServerError,
    integrations::CheckoutGateway,
};

/// Route handler for the health check
#[get("/health")]
pub async fn health() -> impl Responder {
    debug!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// `POST /api/orders`: place an order for the authenticated customer.
pub async fn create_order<B: OrderStore>(
    claims: JwtClaims,
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST /orders for {}", claims.sub);
    let order = api.place_order(&claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

/// `GET /api/orders`: the authenticated customer's order history, newest first.
pub async fn my_orders<B: OrderStore>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.orders_for_user(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(OrderHistory::from(orders)))
}

/// `GET /api/orders/{id}`: a single order.
///
/// For customers the lookup is owner-scoped, so an order that exists but belongs to someone
/// else is a plain 404. Admin tokens see every order.
pub async fn order_by_id<B: OrderStore>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let order = if claims.admin { api.order_by_id(id).await? } else { api.order_for_user(&claims.sub, id).await? };
    Ok(HttpResponse::Ok().json(order))
}

/// `PUT /api/admin/orders/{id}/status`: operator status override. Refused with a 409 when
/// the order is already terminal.
pub async fn update_order_status<B: OrderStore>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    claims.require_admin()?;
    let id = path.into_inner();
    info!("💻️ {} is overriding the status of order {id} to {}", claims.sub, body.status);
    let order = api.override_order_status(id, body.status).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// `POST /api/checkout/gateway`: create a provider-side checkout order so the storefront can
/// open the payment widget.
pub async fn checkout_gateway<G: CheckoutGateway>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError> {
    let amount = body.amount;
    // The provider refuses orders under one rupee.
    if amount.value() < 100 {
        return Err(ServerError::InvalidRequestBody(format!("amount must be at least ₹1.00, got {amount}")));
    }
    debug!("💻️ {} is starting a gateway checkout for {amount}", claims.sub);
    let order = gateway
        .create_checkout_order(amount)
        .await
        .map_err(|e| ServerError::PaymentGatewayError(e.to_string()))?;
    let response = CheckoutResponse {
        gateway_order_id: order.id,
        amount: cpg_common::Money::from_paise(order.amount),
        currency: order.currency,
        key_id: gateway.key_id().to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}
