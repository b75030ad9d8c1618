//! Session verification for app routes.
//!
//! A request is verified when its session loads from the cache, carries an
//! access token granted for the configured scopes, and that token still
//! answers a `shop { name }` query. The session id comes from an App Bridge
//! session token (`Authorization: Bearer`) or the signed session cookie.
//!
//! Two flavours differ only in how they ask for re-authentication:
//!
//! - [`verify_request`] redirects to `/auth?shop=<shop>` (page routes)
//! - [`verify_request_with_header`] answers `403` with the
//!   `X-Shopify-API-Request-Failure-Reauthorize` headers (XHR routes)

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sticky_cart_core::Session;
use tower_cookies::Cookies;

use super::session;
use crate::error::{AppError, set_sentry_shop};
use crate::shopify::{AdminShopifyError, session_token::decode_session_token};
use crate::routes::found;
use crate::state::AppState;

/// Tells App Bridge to re-run OAuth.
pub const REAUTHORIZE_HEADER: &str = "x-shopify-api-request-failure-reauthorize";
/// Where App Bridge should send the top window to re-run OAuth.
pub const REAUTHORIZE_URL_HEADER: &str = "x-shopify-api-request-failure-reauthorize-url";

/// The verified session, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[derive(Debug, Default, Deserialize)]
struct ShopParam {
    shop: Option<String>,
}

/// Why a request could not be verified.
enum Rejection {
    /// Send the merchant through OAuth again.
    Reauth { shop: Option<String> },
    /// Verification itself failed.
    Error(AppError),
}

impl From<AppError> for Rejection {
    fn from(err: AppError) -> Self {
        Self::Error(err)
    }
}

/// Path that restarts OAuth for a shop.
#[must_use]
pub fn auth_path(shop: Option<&str>) -> String {
    match shop.filter(|s| !s.is_empty()) {
        Some(shop) => format!("/auth?shop={}", urlencoding::encode(shop)),
        None => "/auth".to_string(),
    }
}

/// Resolve the current session id from a bearer session token or the cookie.
fn current_session_id(state: &AppState, headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        let shopify = state.shopify();
        return match decode_session_token(token, shopify.api_key(), shopify.api_secret()) {
            Ok((_, shop)) => Some(Session::offline_id(&shop)),
            Err(e) => {
                tracing::warn!(error = %e, "Rejected session token");
                None
            }
        };
    }

    session::session_id(cookies, state.cookie_key())
}

/// Pull the session id and `shop` query parameter out of the request.
///
/// Kept synchronous so no borrow of the (non-`Sync`) request spans an await.
fn resolve(state: &AppState, request: &Request, cookies: &Cookies) -> (Option<String>, Option<String>) {
    let query_shop = Query::<ShopParam>::try_from_uri(request.uri())
        .map(|Query(p)| p.shop)
        .unwrap_or_default();
    let session_id = current_session_id(state, request.headers(), cookies);
    (session_id, query_shop)
}

async fn verify_session(
    state: &AppState,
    session_id: Option<String>,
    query_shop: Option<String>,
) -> Result<Session, Rejection> {
    let Some(session_id) = session_id else {
        return Err(Rejection::Reauth { shop: query_shop });
    };

    let Some(session) = state.sessions().load(&session_id).await.map_err(AppError::from)? else {
        return Err(Rejection::Reauth { shop: query_shop });
    };

    let shop = Some(session.shop.clone());
    if !session.is_usable(&state.config().shopify.scopes) {
        tracing::info!(shop = %session.shop, "Session missing token or scopes changed");
        return Err(Rejection::Reauth { shop });
    }

    match state.shopify().check_access(&session).await {
        Ok(_) => Ok(session),
        Err(AdminShopifyError::Unauthorized(_)) => {
            tracing::info!(shop = %session.shop, "Access token revoked");
            Err(Rejection::Reauth { shop })
        }
        Err(e) => Err(AppError::Internal(format!("session check failed: {e}")).into()),
    }
}

/// Verify the session, redirecting to `/auth` when OAuth must run again.
pub async fn verify_request(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, query_shop) = resolve(&state, &request, &cookies);
    match verify_session(&state, session_id, query_shop).await {
        Ok(session) => {
            set_sentry_shop(&session.shop);
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
        Err(Rejection::Reauth { shop }) => found(&auth_path(shop.as_deref())),
        Err(Rejection::Error(e)) => e.into_response(),
    }
}

/// Verify the session, answering `403` with reauthorize headers on failure.
pub async fn verify_request_with_header(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, query_shop) = resolve(&state, &request, &cookies);
    match verify_session(&state, session_id, query_shop).await {
        Ok(session) => {
            set_sentry_shop(&session.shop);
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
        Err(Rejection::Reauth { shop }) => reauthorize_response(shop.as_deref()),
        Err(Rejection::Error(e)) => e.into_response(),
    }
}

fn reauthorize_response(shop: Option<&str>) -> Response {
    let mut response = StatusCode::FORBIDDEN.into_response();
    let headers = response.headers_mut();
    headers.insert(REAUTHORIZE_HEADER, HeaderValue::from_static("1"));
    if let Ok(url) = HeaderValue::from_str(&auth_path(shop)) {
        headers.insert(REAUTHORIZE_URL_HEADER, url);
    }
    response
}
