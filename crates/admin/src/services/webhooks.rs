//! Inbound webhook processing.
//!
//! Shopify delivers webhooks as signed JSON POSTs. A delivery is accepted only
//! when its `X-Shopify-Hmac-Sha256` header matches the raw body and a handler
//! is registered for its topic. Handlers are added once the matching
//! subscription has been registered with the shop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use sticky_cart_core::ShopDomain;
use thiserror::Error;
use tokio::sync::RwLock;

use super::ActiveShops;
use crate::shopify::hmac;

/// Signature of the raw request body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
/// Delivery topic, e.g. `app/uninstalled`.
pub const TOPIC_HEADER: &str = "x-shopify-topic";
/// Shop the delivery is about.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Webhook topics this app subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    AppUninstalled,
}

impl WebhookTopic {
    /// Name used by the GraphQL `WebhookSubscriptionTopic` enum.
    #[must_use]
    pub const fn graphql_name(self) -> &'static str {
        match self {
            Self::AppUninstalled => "APP_UNINSTALLED",
        }
    }

    /// Name sent in the `X-Shopify-Topic` header.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::AppUninstalled => "app/uninstalled",
        }
    }

    /// Parse an `X-Shopify-Topic` header value.
    ///
    /// Accepts the GraphQL spelling as well.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        [Self::AppUninstalled]
            .into_iter()
            .find(|t| value.eq_ignore_ascii_case(t.header_name()) || value == t.graphql_name())
    }
}

impl std::fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header_name())
    }
}

/// Reasons a webhook delivery is rejected.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing one or more of the required HTTP headers: {0}")]
    MissingHeaders(String),

    #[error("No body was received when processing webhook")]
    EmptyBody,

    #[error("Could not validate request for topic {0}")]
    InvalidSignature(String),

    #[error("No webhook is registered for topic {0}")]
    UnregisteredTopic(String),

    #[error("Webhook handler for {topic} failed: {message}")]
    Handler { topic: WebhookTopic, message: String },
}

impl WebhookError {
    /// Status answered to Shopify for this rejection.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeaders(_) | Self::EmptyBody => StatusCode::BAD_REQUEST,
            Self::InvalidSignature(_) | Self::UnregisteredTopic(_) => StatusCode::FORBIDDEN,
            Self::Handler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A verified webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    pub topic: WebhookTopic,
    /// Raw `X-Shopify-Shop-Domain` value.
    pub shop: String,
    pub body: axum::body::Bytes,
}

/// Reacts to a verified delivery.
#[async_trait]
pub trait WebhookHandler: Send + Sync + 'static {
    async fn handle(&self, delivery: &WebhookDelivery) -> Result<(), String>;
}

/// Removes the uninstalled shop from the active-shop table.
#[derive(Debug, Clone)]
pub struct AppUninstalledHandler {
    active_shops: ActiveShops,
}

impl AppUninstalledHandler {
    #[must_use]
    pub const fn new(active_shops: ActiveShops) -> Self {
        Self { active_shops }
    }
}

#[async_trait]
impl WebhookHandler for AppUninstalledHandler {
    async fn handle(&self, delivery: &WebhookDelivery) -> Result<(), String> {
        let shop = ShopDomain::parse(&delivery.shop).map_err(|e| e.to_string())?;
        match self.active_shops.remove(&shop).await {
            Some(scope) => tracing::info!(shop = %shop, %scope, "App uninstalled"),
            None => tracing::info!(shop = %shop, "App uninstalled for an inactive shop"),
        }
        Ok(())
    }
}

/// Topic → handler table.
#[derive(Clone, Default)]
pub struct WebhookRegistry {
    handlers: Arc<RwLock<HashMap<WebhookTopic, Arc<dyn WebhookHandler>>>>,
}

impl std::fmt::Debug for WebhookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookRegistry").finish_non_exhaustive()
    }
}

impl WebhookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the handler for a topic.
    pub async fn add_handler(&self, topic: WebhookTopic, handler: Arc<dyn WebhookHandler>) {
        self.handlers.write().await.insert(topic, handler);
    }

    pub async fn is_registered(&self, topic: WebhookTopic) -> bool {
        self.handlers.read().await.contains_key(&topic)
    }

    /// Verify and dispatch a delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`WebhookError`] whose [`status`](WebhookError::status) is the
    /// response Shopify should receive.
    pub async fn process(
        &self,
        api_secret: &[u8],
        headers: &HeaderMap,
        body: axum::body::Bytes,
    ) -> Result<WebhookTopic, WebhookError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
        };

        let (signature, topic, shop) =
            match (header(HMAC_HEADER), header(TOPIC_HEADER), header(SHOP_DOMAIN_HEADER)) {
                (Some(signature), Some(topic), Some(shop)) => (signature, topic, shop),
                (signature, topic, shop) => {
                    let missing: Vec<&str> = [
                        (HMAC_HEADER, signature.is_none()),
                        (TOPIC_HEADER, topic.is_none()),
                        (SHOP_DOMAIN_HEADER, shop.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                    return Err(WebhookError::MissingHeaders(missing.join(", ")));
                }
            };

        if body.is_empty() {
            return Err(WebhookError::EmptyBody);
        }

        if !hmac::verify_body(&body, signature, api_secret) {
            return Err(WebhookError::InvalidSignature(topic.to_string()));
        }

        let parsed = WebhookTopic::from_header(topic)
            .ok_or_else(|| WebhookError::UnregisteredTopic(topic.to_string()))?;
        let handler = self
            .handlers
            .read()
            .await
            .get(&parsed)
            .cloned()
            .ok_or_else(|| WebhookError::UnregisteredTopic(topic.to_string()))?;

        let delivery = WebhookDelivery {
            topic: parsed,
            shop: shop.to_string(),
            body,
        };
        handler
            .handle(&delivery)
            .await
            .map_err(|message| WebhookError::Handler {
                topic: parsed,
                message,
            })?;

        Ok(parsed)
    }
}
