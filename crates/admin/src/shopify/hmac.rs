//! HMAC signature checks for requests signed by Shopify.
//!
//! - OAuth redirects carry a hex `hmac` query parameter computed over the
//!   remaining parameters.
//! - Webhook deliveries carry a base64 `X-Shopify-Hmac-Sha256` header
//!   computed over the raw request body.
//!
//! Both use HMAC-SHA256 keyed with the app's API secret and are compared in
//! constant time via [`Mac::verify_slice`].

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query parameters excluded from the OAuth signature message.
const UNSIGNED_PARAMS: &[&str] = &["hmac", "signature"];

/// Build the OAuth signature message: parameters sorted by key, `k=v`, joined by `&`.
fn query_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| !UNSIGNED_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the hex OAuth signature for a set of query parameters.
#[must_use]
pub fn sign_query(params: &BTreeMap<String, String>, secret: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(query_message(params).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the `hmac` parameter of an OAuth redirect.
#[must_use]
pub fn verify_query(params: &BTreeMap<String, String>, secret: &[u8]) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(query_message(params).as_bytes());
    mac.verify_slice(&provided).is_ok()
}

/// Compute the base64 webhook signature of a raw body.
#[must_use]
pub fn sign_body(body: &[u8], secret: &[u8]) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify the `X-Shopify-Hmac-Sha256` header of a webhook delivery.
#[must_use]
pub fn verify_body(body: &[u8], provided: &str, secret: &[u8]) -> bool {
    let Ok(provided) = BASE64.decode(provided.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}
