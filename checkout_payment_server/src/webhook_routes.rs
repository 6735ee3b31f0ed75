//! The payment provider's webhook.
//!
//! The provider signs the raw request body with HMAC-SHA256 and puts the hex digest in the
//! `X-Signature` header. Verification therefore runs over the exact bytes received, before
//! any JSON parsing. Once a payload is authenticated, almost nothing it contains is worth a
//! non-2xx response: the provider retries on errors, and retrying a duplicate or orphaned
//! event will never make it resolvable. Only a storage failure earns a 500.

use actix_web::{web, HttpRequest, HttpResponse};
use checkout_payment_engine::{
    events::GatewayEvent,
    helpers::verify_webhook_signature,
    traits::OrderFlowError,
    OrderFlowApi,
    OrderStore,
};
use log::{error, warn};
use serde_json::json;

use crate::{config::GatewayConfig, errors::ServerError};

pub const SIGNATURE_HEADER: &str = "X-Signature";

/// `POST /payments/webhook`.
pub async fn gateway_webhook<B: OrderStore>(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<GatewayConfig>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let secret = config.webhook_secret.reveal();
    if secret.is_empty() {
        error!("🔐️ A webhook arrived but no webhook secret is configured. Rejecting.");
        return Err(ServerError::ConfigurationError("No webhook secret is configured".to_string()));
    }
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ServerError::InvalidWebhookSignature)?;
    if !verify_webhook_signature(secret, &body, signature) {
        warn!("🔐️ Rejected a webhook delivery with a bad signature");
        return Err(ServerError::InvalidWebhookSignature);
    }
    // Authenticated from here on. An unparseable body is acknowledged and dropped, since the
    // provider would only redeliver the same bytes.
    let event = match serde_json::from_slice::<GatewayEvent>(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("🔐️ Discarding a verified but unparseable webhook payload. {e}");
            return Ok(HttpResponse::Ok().json(json!({ "status": "ok", "outcome": "discarded" })));
        },
    };
    match api.handle_gateway_event(event).await {
        Ok(outcome) => {
            // The provider only checks the status code, but "status": "ok" is part of the
            // documented response shape. The outcome detail rides along for operators.
            let mut body = serde_json::to_value(&outcome)
                .map_err(|e| ServerError::Unspecified(format!("Could not serialize webhook outcome. {e}")))?;
            body["status"] = json!("ok");
            Ok(HttpResponse::Ok().json(body))
        },
        Err(OrderFlowError::DatabaseError(e)) => {
            error!("🔐️ Could not apply a webhook event. {e}");
            Err(OrderFlowError::DatabaseError(e).into())
        },
        Err(e) => Err(e.into()),
    }
}
