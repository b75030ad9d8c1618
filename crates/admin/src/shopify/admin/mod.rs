//! Shopify Admin API GraphQL client with OAuth authentication.
//!
//! This module provides a type-safe client for interacting with the
//! Shopify Admin API using GraphQL. Requests are made on behalf of a
//! [`Session`], which supplies the shop and its access token.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use sticky_cart_core::{Session, ShopDomain};
use tracing::instrument;

use crate::config::ShopifyAppConfig;

use super::{
    AdminShopifyError, GraphQLError, GraphQLErrorLocation, UserError, format_user_errors,
};

pub mod oauth;
mod proxy;
pub use proxy::ProxiedResponse;
pub mod queries;
mod script_tags;
mod webhooks;

use queries::{GetShop, get_shop};

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Shopify Admin API GraphQL client.
///
/// Provides type-safe access to the Admin API for any installed shop.
/// Cheap to clone; all clones share one connection pool.
///
/// # Security
///
/// Holds the app's API secret, which signs OAuth redirects, webhooks,
/// session tokens and cookies.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    /// Replaces `https://<shop>` for every request (used to point at a mock server)
    base_url: Option<String>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify app configuration
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a client that sends every request to `base_url` instead of the shop.
    #[must_use]
    pub fn with_base_url(config: &ShopifyAppConfig, base_url: impl Into<String>) -> Self {
        Self::build(config, Some(base_url.into()))
    }

    fn build(config: &ShopifyAppConfig, base_url: Option<String>) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                api_version: config.api_version.clone(),
                base_url,
            }),
        }
    }

    /// Get the API key (OAuth client ID).
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.inner.api_key
    }

    /// Get the API secret bytes (for HMAC and JWT verification).
    #[must_use]
    pub fn api_secret(&self) -> &[u8] {
        self.inner.api_secret.expose_secret().as_bytes()
    }

    /// Get the Admin API version.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// Origin requests for `shop` are sent to.
    fn shop_url(&self, shop: &ShopDomain) -> String {
        self.inner
            .base_url
            .clone()
            .unwrap_or_else(|| shop.origin())
    }

    /// Admin API endpoint for a shop, e.g. `graphql.json` or `products.json`.
    fn admin_endpoint(&self, shop: &ShopDomain, resource: &str) -> String {
        format!(
            "{}/admin/api/{}/{}",
            self.shop_url(shop),
            self.inner.api_version,
            resource
        )
    }

    /// Extract the shop and access token from a session.
    fn credentials(session: &Session) -> Result<(ShopDomain, &str), AdminShopifyError> {
        let shop = session
            .shop_domain()
            .map_err(|_| AdminShopifyError::InvalidShop(session.shop.clone()))?;
        let token = session
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AdminShopifyError::NoAccessToken(session.shop.clone()))?;
        Ok((shop, token))
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query for the session's shop.
    async fn execute<Q: GraphQLQuery>(
        &self,
        session: &Session,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let (shop, access_token) = Self::credentials(session)?;
        let endpoint = self.admin_endpoint(&shop, "graphql.json");

        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(60, |secs| secs.ceil() as u64);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let graphql_response: GraphQLResponse<Q::ResponseData> = response.json().await?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    /// Confirm the session's token still works by fetching the shop name.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Unauthorized` if the token was revoked,
    /// or another error if the request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn check_access(&self, session: &Session) -> Result<String, AdminShopifyError> {
        let response = self.execute::<GetShop>(session, get_shop::Variables).await?;
        Ok(response.shop.name)
    }
}

/// Fail with `AdminShopifyError::UserError` if a mutation returned `userErrors`.
///
/// Takes `(field, message)` pairs from the generated selection types.
fn check_user_errors<I>(errors: I) -> Result<(), AdminShopifyError>
where
    I: IntoIterator<Item = (Option<Vec<String>>, String)>,
{
    let errors: Vec<UserError> = errors
        .into_iter()
        .map(|(field, message)| UserError {
            field: field.unwrap_or_default(),
            message,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminShopifyError::UserError(format_user_errors(&errors)))
    }
}
