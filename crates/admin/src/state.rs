//! Application state shared across handlers.

use std::sync::Arc;

use sha2::{Digest, Sha512};
use tower_cookies::Key;

use crate::config::AppConfig;
use crate::services::{ActiveShops, WebhookRegistry};
use crate::shopify::AdminClient;
use crate::storage::SessionStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// session cache, the Admin API client and the in-memory shop tables.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    sessions: Arc<dyn SessionStorage>,
    shopify: AdminClient,
    active_shops: ActiveShops,
    webhooks: WebhookRegistry,
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `sessions` - Session cache backend
    #[must_use]
    pub fn new(config: AppConfig, sessions: Arc<dyn SessionStorage>) -> Self {
        let shopify = AdminClient::new(&config.shopify);
        Self::with_client(config, sessions, shopify)
    }

    /// Create a state around an existing Admin API client.
    #[must_use]
    pub fn with_client(
        config: AppConfig,
        sessions: Arc<dyn SessionStorage>,
        shopify: AdminClient,
    ) -> Self {
        let cookie_key = cookie_key(shopify.api_secret());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                shopify,
                active_shops: ActiveShops::new(),
                webhooks: WebhookRegistry::new(),
                cookie_key,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the session cache.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStorage {
        self.inner.sessions.as_ref()
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Get the table of shops that completed OAuth.
    #[must_use]
    pub fn active_shops(&self) -> &ActiveShops {
        &self.inner.active_shops
    }

    /// Get the webhook handler registry.
    #[must_use]
    pub fn webhooks(&self) -> &WebhookRegistry {
        &self.inner.webhooks
    }

    /// Key used to sign the app's cookies.
    #[must_use]
    pub fn cookie_key(&self) -> &Key {
        &self.inner.cookie_key
    }
}

/// Derive the 64-byte cookie signing key from the API secret.
fn cookie_key(api_secret: &[u8]) -> Key {
    let digest = Sha512::digest(api_secret);
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_stable() {
        let a = cookie_key(b"shpss_secret");
        let b = cookie_key(b"shpss_secret");
        let c = cookie_key(b"shpss_other");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
