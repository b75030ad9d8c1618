//! Shop session record.

use serde::{Deserialize, Serialize};

use super::{AuthScopes, ShopDomain};

/// Prefix of offline (shop-wide) session ids.
const OFFLINE_PREFIX: &str = "offline_";

/// An authenticated shop's credential record.
///
/// This is the value persisted in the session cache, JSON-encoded with the
/// field names `id`, `shop`, `state`, `scope` and `accessToken`. A session is
/// created with only the OAuth `state` nonce when the handshake starts and
/// gains `scope` and `accessToken` when it completes.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session id, the cache key.
    pub id: String,
    /// Shop domain the session belongs to.
    pub shop: String,
    /// OAuth `state` nonce issued when the handshake started.
    pub state: String,
    /// Granted scopes as returned by the platform (comma-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Admin API access token (HIGH PRIVILEGE - redacted in debug output).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("state", &self.state)
            .field("scope", &self.scope)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Session {
    /// The offline session id for a shop.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("{OFFLINE_PREFIX}{shop}")
    }

    /// Start a new offline session for a shop, holding only the OAuth nonce.
    #[must_use]
    pub fn begin_offline(shop: &ShopDomain, state: impl Into<String>) -> Self {
        Self {
            id: Self::offline_id(shop),
            shop: shop.to_string(),
            state: state.into(),
            scope: None,
            access_token: None,
        }
    }

    /// Record the outcome of a completed handshake.
    pub fn complete(&mut self, access_token: impl Into<String>, scope: impl Into<String>) {
        self.access_token = Some(access_token.into());
        self.scope = Some(scope.into());
    }

    /// Parse the session's shop domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored shop is not a valid shop domain.
    pub fn shop_domain(&self) -> Result<ShopDomain, super::ShopDomainError> {
        ShopDomain::parse(&self.shop)
    }

    /// Granted scopes as a set.
    #[must_use]
    pub fn scopes(&self) -> AuthScopes {
        self.scope.as_deref().map(AuthScopes::parse).unwrap_or_default()
    }

    /// Whether the session carries a token granted for exactly `configured`.
    #[must_use]
    pub fn is_usable(&self, configured: &AuthScopes) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty()) && self.scopes() == *configured
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shop() -> ShopDomain {
        ShopDomain::parse("store.myshopify.com").unwrap()
    }

    #[test]
    fn test_offline_id() {
        assert_eq!(Session::offline_id(&shop()), "offline_store.myshopify.com");
    }

    #[test]
    fn test_json_field_names() {
        let mut session = Session::begin_offline(&shop(), "123456789012345");
        session.complete("shpat_abc", "write_script_tags");

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["id"], "offline_store.myshopify.com");
        assert_eq!(value["shop"], "store.myshopify.com");
        assert_eq!(value["state"], "123456789012345");
        assert_eq!(value["scope"], "write_script_tags");
        assert_eq!(value["accessToken"], "shpat_abc");
    }

    #[test]
    fn test_pending_session_omits_token_fields() {
        let session = Session::begin_offline(&shop(), "nonce");
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("accessToken"));
        assert!(!json.contains("scope"));

        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut session = Session::begin_offline(&shop(), "nonce");
        session.complete("shpat_super_secret", "read_products");
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shpat_super_secret"));
    }

    #[test]
    fn test_is_usable() {
        let configured = AuthScopes::parse("write_script_tags,read_script_tags");
        let mut session = Session::begin_offline(&shop(), "nonce");
        assert!(!session.is_usable(&configured));

        session.complete("shpat_abc", "write_script_tags");
        assert!(session.is_usable(&configured));

        session.scope = Some("read_products".to_string());
        assert!(!session.is_usable(&configured));
    }
}
