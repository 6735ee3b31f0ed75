//! Access tokens.
//!
//! Tokens are HS256 JWTs carried in the `Authorization: Bearer` header. The claims are
//! deliberately small: the subject is the customer id that orders are scoped to, and `admin`
//! gates the operator endpoints. Handlers receive the claims through the [`FromRequest`]
//! extractor, so an endpoint that takes a [`JwtClaims`] parameter is authenticated by
//! construction; admin checks are explicit calls at the top of the handler.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The customer id. Orders placed and listed with this token belong to this customer.
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    /// Expiry, in seconds since the epoch.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: String, admin: bool, expires: DateTime<Utc>) -> Self {
        Self { sub, admin, exp: expires.timestamp() }
    }

    /// Rejects non-admin callers. Call this first in any operator endpoint.
    pub fn require_admin(&self) -> Result<(), ServerError> {
        if self.admin {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions.into())
        }
    }
}

/// Signs tokens. Only used by the login tooling and the tests; the server itself never
/// issues tokens, it only verifies them.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes()) }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| ServerError::Unspecified(format!("Could not sign access token. {e}")))
    }
}

pub fn validate_token(token: &str, config: &AuthConfig) -> Result<JwtClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
    let data = decode::<JwtClaims>(token, &key, &Validation::new(Algorithm::HS256))
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;
    Ok(data.claims)
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| ServerError::ConfigurationError("No authentication key is configured".to_string()))?;
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::ValidationError("The Authorization header is not a bearer token".to_string()))?;
    Ok(validate_token(token, config)?)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
