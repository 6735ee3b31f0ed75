//! REST client for the payment provider.
//!
//! The provider exposes a Razorpay-compatible orders API: `POST {api_url}/orders` with HTTP
//! basic auth creates a checkout order that the storefront widget then collects payment
//! against. Amounts on the wire are integer paise.

use cpg_common::{Money, CURRENCY_CODE};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("The gateway credentials are not configured")]
    NotConfigured,
    #[error("The gateway request failed. {0}")]
    RequestFailed(String),
    #[error("The gateway returned an unexpected response. {0}")]
    UnexpectedResponse(String),
}

/// A checkout order as the provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCheckoutOrder {
    pub id: String,
    /// Integer paise.
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    payment_capture: u8,
}

/// The part of the provider API the server uses. A trait so endpoint tests can stub the
/// network out.
#[allow(async_fn_in_trait)]
pub trait CheckoutGateway: Clone + Send + Sync + 'static {
    /// Creates a provider-side checkout order for `amount`.
    async fn create_checkout_order(&self, amount: Money) -> Result<GatewayCheckoutOrder, GatewayError>;

    /// The public key id the storefront widget is initialised with.
    fn key_id(&self) -> &str;
}

#[derive(Clone)]
pub struct RemoteGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl RemoteGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }
}

impl CheckoutGateway for RemoteGateway {
    async fn create_checkout_order(&self, amount: Money) -> Result<GatewayCheckoutOrder, GatewayError> {
        if self.config.key_id.is_empty() || self.config.key_secret.reveal().is_empty() {
            return Err(GatewayError::NotConfigured);
        }
        let url = format!("{}/orders", self.config.api_url.trim_end_matches('/'));
        let body = CreateOrderBody { amount: amount.value(), currency: CURRENCY_CODE, payment_capture: 1 };
        debug!("💻️ Creating gateway checkout order for {amount}");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!("💻️ Gateway order creation failed with {status}: {detail}");
            return Err(GatewayError::UnexpectedResponse(format!("{status}: {detail}")));
        }
        response.json::<GatewayCheckoutOrder>().await.map_err(|e| GatewayError::UnexpectedResponse(e.to_string()))
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }
}
