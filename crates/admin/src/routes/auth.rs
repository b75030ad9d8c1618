//! Shopify OAuth routes.
//!
//! These routes install the app on a shop: escape the admin iframe, redirect
//! to Shopify's consent screen, and exchange the returned code for an offline
//! access token.

use std::collections::BTreeMap;
use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use rand::Rng;
use serde::Deserialize;
use sticky_cart_core::{Session, ShopDomain};
use tower_cookies::Cookies;
use tracing::instrument;

use super::found;
use crate::error::AppError;
use crate::middleware::{auth_path, session};
use crate::services::{AppUninstalledHandler, WebhookTopic};
use crate::shopify::hmac;
use crate::state::AppState;

/// Length of the numeric OAuth `state` nonce.
const NONCE_LENGTH: usize = 15;

// =============================================================================
// Templates
// =============================================================================

/// Page that moves the top window out of the admin iframe.
#[derive(Template)]
#[template(path = "exit_iframe.html")]
pub struct ExitIframeTemplate {
    pub api_key: String,
    pub shop_origin: String,
    pub redirect_url: String,
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ShopParams {
    pub shop: Option<String>,
}

fn parse_shop(shop: Option<&str>) -> Result<ShopDomain, AppError> {
    let shop = shop.ok_or_else(|| AppError::BadRequest("missing shop parameter".to_string()))?;
    ShopDomain::parse(shop).map_err(|e| AppError::BadRequest(format!("invalid shop: {e}")))
}

/// Random numeric nonce for the OAuth `state` parameter.
fn generate_nonce() -> String {
    let mut rng = rand::rng();
    (0..NONCE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /auth - Start OAuth.
///
/// Inside the admin iframe the browser would refuse the consent screen, so
/// the first visit only bounces the top window through `/auth/toplevel`.
#[instrument(skip(state, cookies))]
pub async fn begin(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<ShopParams>,
) -> Result<Response, AppError> {
    let shop = parse_shop(params.shop.as_deref())?;
    let key = state.cookie_key();

    if !session::has_top_level_oauth(&cookies, key) {
        let template = ExitIframeTemplate {
            api_key: state.shopify().api_key().to_string(),
            shop_origin: shop.to_string(),
            redirect_url: format!(
                "{}/auth/toplevel?shop={}",
                state.config().base_url(),
                shop
            ),
        };
        return Ok(Html(template.render()?).into_response());
    }
    session::clear_top_level_oauth(&cookies);

    let nonce = generate_nonce();
    let pending = Session::begin_offline(&shop, nonce.clone());
    state.sessions().store(&pending).await?;
    session::set_session_id(&cookies, key, &pending.id);

    let auth_url = state.shopify().authorization_url(
        &shop,
        &state.config().auth_callback_url(),
        &state.config().shopify.scopes,
        &nonce,
    )?;

    tracing::info!(shop = %shop, "Redirecting to Shopify OAuth");
    Ok(found(&auth_url))
}

/// GET /auth/toplevel - Mark the top-level visit and return to `/auth`.
#[instrument(skip(state, cookies))]
pub async fn top_level(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<ShopParams>,
) -> Result<Response, AppError> {
    let shop = parse_shop(params.shop.as_deref())?;
    session::set_top_level_oauth(&cookies, state.cookie_key());
    Ok(found(&auth_path(Some(shop.as_str()))))
}

/// GET /auth/callback - Finish OAuth.
///
/// On success the session is persisted, the shop becomes active, and the
/// uninstall webhook is registered before returning to the app.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    // Verify HMAC signature from Shopify
    if !hmac::verify_query(&params, state.shopify().api_secret()) {
        tracing::warn!("Invalid HMAC signature in OAuth callback");
        return Err(AppError::BadRequest("invalid hmac".to_string()));
    }

    let shop = parse_shop(params.get("shop").map(String::as_str))?;
    let code = params
        .get("code")
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing authorization code".to_string()))?;

    let Some(session_id) = session::session_id(&cookies, state.cookie_key()) else {
        tracing::info!(shop = %shop, "OAuth callback without session cookie");
        return Ok(found(&auth_path(Some(shop.as_str()))));
    };
    let Some(mut session) = state.sessions().load(&session_id).await? else {
        tracing::info!(shop = %shop, "OAuth session expired");
        return Ok(found(&auth_path(Some(shop.as_str()))));
    };

    // Verify state matches what we stored
    if params.get("state") != Some(&session.state) || session.shop != shop.as_str() {
        tracing::warn!(shop = %shop, "OAuth state mismatch");
        return Err(AppError::BadRequest("invalid state".to_string()));
    }

    // Exchange code for token
    let token = state.shopify().exchange_code(&shop, code).await?;

    session.complete(token.access_token, token.scope.clone());
    state.sessions().store(&session).await?;
    state.active_shops().insert(shop.clone(), token.scope).await;
    tracing::info!(shop = %shop, "Shop authenticated");

    register_uninstall_webhook(&state, &session).await;

    // Read back what was stored
    match state.sessions().load(&session.id).await {
        Ok(Some(_)) => {}
        Ok(None) => tracing::warn!(shop = %shop, "Session missing right after storing it"),
        Err(e) => tracing::warn!(shop = %shop, error = %e, "Failed to reload session"),
    }

    Ok(found(&format!("/?shop={shop}")))
}

/// Subscribe the shop to `APP_UNINSTALLED`; failures are logged only.
async fn register_uninstall_webhook(state: &AppState, session: &Session) {
    let topic = WebhookTopic::AppUninstalled;
    let result = state
        .shopify()
        .register_webhook(session, topic.graphql_name(), &state.config().webhook_url())
        .await;

    match result {
        Ok(outcome) => {
            state
                .webhooks()
                .add_handler(
                    topic,
                    Arc::new(AppUninstalledHandler::new(state.active_shops().clone())),
                )
                .await;
            tracing::info!(shop = %session.shop, ?outcome, "Registered APP_UNINSTALLED webhook");
        }
        Err(e) => {
            tracing::error!(shop = %session.shop, error = %e, "Failed to register APP_UNINSTALLED webhook");
        }
    }
}
