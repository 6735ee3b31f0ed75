mod signatures;

pub use signatures::{
    checkout_signature, verify_checkout_signature, verify_webhook_signature, webhook_signature,
};
