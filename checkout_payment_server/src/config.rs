//! Server configuration, read from the environment.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CPG_HOST` | Bind address | `127.0.0.1` |
//! | `CPG_PORT` | Bind port | `4000` |
//! | `CPG_DATABASE_URL` | SQLite database URL | `sqlite://data/cpg.db` |
//! | `CPG_JWT_SECRET` | HMAC key for access tokens | random (see below) |
//! | `CPG_GATEWAY_API_URL` | Payment provider REST base URL | Razorpay's v1 API |
//! | `CPG_GATEWAY_KEY_ID` | Provider API key id | empty |
//! | `CPG_GATEWAY_KEY_SECRET` | Provider API key secret | empty |
//! | `CPG_GATEWAY_WEBHOOK_SECRET` | Webhook HMAC secret | empty |
//!
//! Missing gateway credentials do not stop the server from starting; the affected endpoints
//! fail at request time instead, so that the rest of the API stays usable in development.

use std::env;

use cpg_common::Secret;
use log::*;
use rand::distributions::{Alphanumeric, DistString};

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 4000;
const DEFAULT_GATEWAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default.");
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = checkout_payment_engine::sqlite::db_url();
        Self {
            host,
            port,
            database_url,
            auth: AuthConfig::from_env_or_default(),
            gateway: GatewayConfig::from_env_or_default(),
        }
    }
}

/// Key material for issuing and verifying access tokens.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        match env::var("CPG_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Self { jwt_secret: Secret::new(secret) },
            _ => {
                warn!(
                    "🪛️ CPG_JWT_SECRET is not set. Generating a random secret for this run. Tokens will not survive \
                     a restart, so set this variable in production."
                );
                let secret = Alphanumeric.sample_string(&mut rand::thread_rng(), 48);
                Self { jwt_secret: Secret::new(secret) }
            },
        }
    }
}

/// Credentials and endpoints for the payment provider.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    /// Base URL of the provider's REST API (a Razorpay-compatible orders API).
    pub api_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// The secret the provider signs webhook bodies with.
    pub webhook_secret: Secret<String>,
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("CPG_GATEWAY_API_URL").ok().unwrap_or_else(|| DEFAULT_GATEWAY_API_URL.into());
        let key_id = env::var("CPG_GATEWAY_KEY_ID").unwrap_or_default();
        let key_secret = Secret::new(env::var("CPG_GATEWAY_KEY_SECRET").unwrap_or_default());
        let webhook_secret = Secret::new(env::var("CPG_GATEWAY_WEBHOOK_SECRET").unwrap_or_default());
        if key_id.is_empty() || key_secret.reveal().is_empty() {
            warn!("🪛️ Gateway API credentials are not configured. Online checkout will be unavailable.");
        }
        if webhook_secret.reveal().is_empty() {
            warn!("🪛️ CPG_GATEWAY_WEBHOOK_SECRET is not set. Webhook deliveries will be rejected.");
        }
        Self { api_url, key_id, key_secret, webhook_secret }
    }
}
