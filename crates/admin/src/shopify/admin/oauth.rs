//! OAuth authorization-code grant for installing the app on a shop.

use serde::{Deserialize, Serialize};
use sticky_cart_core::{AuthScopes, ShopDomain};
use tracing::instrument;
use url::Url;

use super::{AdminClient, AdminShopifyError};

/// Token returned by `/admin/oauth/access_token` for an offline grant.
#[derive(Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// Permanent Admin API access token.
    pub access_token: String,
    /// Comma-separated scopes actually granted.
    pub scope: String,
}

impl std::fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

impl AdminClient {
    /// Build the URL the merchant is sent to for approving the app.
    ///
    /// An empty `grant_options[]` requests an offline (non-expiring) token.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::InvalidShop` if the shop origin cannot form a URL.
    pub fn authorization_url(
        &self,
        shop: &ShopDomain,
        redirect_uri: &str,
        scopes: &AuthScopes,
        state: &str,
    ) -> Result<String, AdminShopifyError> {
        let mut url = Url::parse(&format!("{}/admin/oauth/authorize", self.shop_url(shop)))
            .map_err(|_| AdminShopifyError::InvalidShop(shop.to_string()))?;

        url.query_pairs_mut()
            .append_pair("client_id", self.api_key())
            .append_pair("scope", &scopes.to_string())
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("grant_options[]", "");

        Ok(url.into())
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::OAuth` if Shopify rejects the code,
    /// or an HTTP/parse error if the request fails.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<AccessTokenResponse, AdminShopifyError> {
        use secrecy::ExposeSecret;

        let endpoint = format!("{}/admin/oauth/access_token", self.shop_url(shop));
        let request = AccessTokenRequest {
            client_id: self.api_key(),
            client_secret: self.inner.api_secret.expose_secret(),
            code,
        };

        let response = self
            .inner
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Access token exchange rejected");
            return Err(AdminShopifyError::OAuth(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let token: AccessTokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(AdminShopifyError::OAuth(
                "token exchange returned an empty access token".to_string(),
            ));
        }

        Ok(token)
    }
}
