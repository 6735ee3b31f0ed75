//! HMAC-SHA256 signatures for the two places the payment provider authenticates itself.
//!
//! * Webhooks carry a hex digest over the **raw** request body in the `X-Signature` header,
//!   keyed with the webhook secret. Verification must run over the exact bytes received,
//!   before any JSON parsing.
//! * Checkout confirmations carry a digest over `"{order_id}|{payment_id}"`, keyed with the
//!   gateway API secret.
//!
//! Verification goes through [`Mac::verify_slice`], which compares in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The hex-encoded webhook signature for a raw request body. Used by tests and tooling to
/// forge valid provider requests.
pub fn webhook_signature(secret: &str, body: &[u8]) -> String {
    sign(secret, body)
}

/// Checks a webhook signature against the raw request body. Returns `false` for malformed
/// hex as well as for a genuine mismatch.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    verify(secret, body, signature)
}

/// The hex-encoded signature for a checkout confirmation tuple.
pub fn checkout_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    sign(secret, format!("{order_id}|{payment_id}").as_bytes())
}

/// Checks the client-submitted confirmation signature for an `(order_id, payment_id)` pair.
pub fn verify_checkout_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    verify(secret, format!("{order_id}|{payment_id}").as_bytes(), signature)
}

fn sign(secret: &str, message: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = new_mac(secret);
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

fn new_mac(secret: &str) -> HmacSha256 {
    // HMAC-SHA256 accepts keys of any length
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}
