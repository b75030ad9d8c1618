//! Session tokens issued to embedded apps by the Shopify admin.
//!
//! App Bridge attaches a short-lived HS256 JWT as `Authorization: Bearer <token>`.
//! It is signed with the app's API secret, its audience is the API key and its
//! `dest` claim is the shop's origin.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use sticky_cart_core::ShopDomain;
use thiserror::Error;

/// Clock skew tolerated on `exp`/`nbf`, in seconds.
const LEEWAY_SECS: u64 = 5;

/// Errors that can occur when decoding a session token.
#[derive(Debug, Error)]
pub enum SessionTokenError {
    /// Signature, audience or time-based validation failed.
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The `dest` claim is not a shop origin.
    #[error("session token destination is not a shop: {0}")]
    InvalidDestination(String),

    /// The issuer does not belong to the destination shop.
    #[error("session token issuer does not match its destination")]
    IssuerMismatch,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Shop admin URL (`https://<shop>/admin`).
    pub iss: String,
    /// Shop origin (`https://<shop>`).
    pub dest: String,
    /// App API key.
    pub aud: String,
    /// Staff member ID.
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub nbf: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
}

impl SessionTokenClaims {
    /// The shop the token was issued for.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDestination` if `dest` is not a valid shop origin.
    pub fn shop(&self) -> Result<ShopDomain, SessionTokenError> {
        let invalid = || SessionTokenError::InvalidDestination(self.dest.clone());
        let url = url::Url::parse(&self.dest).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?;
        ShopDomain::parse(host).map_err(|_| invalid())
    }
}

/// Decode and validate a session token, returning the shop it belongs to.
///
/// # Errors
///
/// Returns an error if the signature, audience, expiry, destination or
/// issuer is invalid.
pub fn decode_session_token(
    token: &str,
    api_key: &str,
    api_secret: &[u8],
) -> Result<(SessionTokenClaims, ShopDomain), SessionTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[api_key]);
    validation.leeway = LEEWAY_SECS;
    validation.validate_nbf = true;

    let data = decode::<SessionTokenClaims>(token, &DecodingKey::from_secret(api_secret), &validation)?;
    let claims = data.claims;
    let shop = claims.shop()?;

    if claims.iss.trim_end_matches('/') != format!("{}/admin", shop.origin()) {
        return Err(SessionTokenError::IssuerMismatch);
    }

    Ok((claims, shop))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};

    pub(crate) fn issue_token(shop: &str, api_key: &str, secret: &[u8], exp_offset: i64) -> String {
        let now = get_current_timestamp();
        let exp = now.saturating_add_signed(exp_offset);
        let claims = SessionTokenClaims {
            iss: format!("https://{shop}/admin"),
            dest: format!("https://{shop}"),
            aud: api_key.to_string(),
            sub: Some("42".to_string()),
            exp,
            nbf: Some(now.saturating_sub(10)),
            iat: Some(now.saturating_sub(10)),
            jti: Some("00000000-0000-0000-0000-000000000000".to_string()),
            sid: Some("session-id".to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let token = issue_token("store.myshopify.com", "api-key", b"secret", 60);
        let (claims, shop) = decode_session_token(&token, "api-key", b"secret").unwrap();
        assert_eq!(shop.as_str(), "store.myshopify.com");
        assert_eq!(claims.sub.as_deref(), Some("42"));
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = issue_token("store.myshopify.com", "api-key", b"secret", 60);
        let err = decode_session_token(&token, "api-key", b"other").unwrap_err();
        assert!(matches!(err, SessionTokenError::Invalid(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_audience() {
        let token = issue_token("store.myshopify.com", "someone-else", b"secret", 60);
        assert!(decode_session_token(&token, "api-key", b"secret").is_err());
    }

    #[test]
    fn test_decode_rejects_expired() {
        let token = issue_token("store.myshopify.com", "api-key", b"secret", -120);
        assert!(decode_session_token(&token, "api-key", b"secret").is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_destination() {
        let token = issue_token("evil.example.com", "api-key", b"secret", 60);
        let err = decode_session_token(&token, "api-key", b"secret").unwrap_err();
        assert!(matches!(err, SessionTokenError::InvalidDestination(_)));
    }
}
