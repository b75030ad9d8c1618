//! Raw pass-through requests: the `/graphql` proxy and the REST sample.

use axum::body::Bytes;
use sticky_cart_core::Session;
use tracing::instrument;

use super::{ACCESS_TOKEN_HEADER, AdminClient, AdminShopifyError};

/// An upstream response relayed verbatim to the browser.
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    /// Upstream HTTP status.
    pub status: u16,
    /// Upstream `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Upstream body.
    pub body: Bytes,
}

impl AdminClient {
    /// Forward a GraphQL request body to the shop's Admin API unchanged.
    ///
    /// The upstream status and body are returned as-is, including GraphQL
    /// errors, so the browser sees exactly what Shopify answered.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no token or the request cannot be sent.
    #[instrument(skip(self, session, body), fields(shop = %session.shop, bytes = body.len()))]
    pub async fn proxy_graphql(
        &self,
        session: &Session,
        body: Bytes,
    ) -> Result<ProxiedResponse, AdminShopifyError> {
        let (shop, access_token) = Self::credentials(session)?;
        let endpoint = self.admin_endpoint(&shop, "graphql.json");

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(ProxiedResponse {
            status,
            content_type,
            body,
        })
    }

    /// Fetch the shop's products through the REST Admin API.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Status` on a non-success response, or an
    /// HTTP/parse error if the request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_products_rest(
        &self,
        session: &Session,
    ) -> Result<serde_json::Value, AdminShopifyError> {
        let (shop, access_token) = Self::credentials(session)?;
        let endpoint = self.admin_endpoint(&shop, "products.json");

        let response = self
            .inner
            .client
            .get(&endpoint)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
