//! HTTP route handlers for the app server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//!
//! # Page (gated by the active-shop table)
//! GET  /?shop=                       - Admin page
//!
//! # OAuth
//! GET  /auth?shop=                   - Start OAuth (escapes the admin iframe first)
//! GET  /auth/toplevel?shop=          - Set the top-level cookie, back to /auth
//! GET  /auth/callback                - Finish OAuth
//!
//! # Shopify -> app
//! POST /webhooks                     - Signed webhook deliveries
//!
//! # Verified, 403 + reauthorize headers on failure
//! POST /graphql                      - Admin GraphQL proxy
//! POST /actions/script-tags/create   - Install the storefront script
//! POST /actions/script-tags/update   - Repoint a script tag
//! POST /actions/script-tags/delete   - Remove a script tag
//! POST /actions/rest-test            - Call the REST sample
//!
//! # Unverified assets
//! GET  /_next/static/*               - Static files
//! GET  /_next/webpack-hmr            - 204 in development, 404 in production
//!
//! # Verified, redirect to /auth on failure
//! GET  /api/products                 - REST sample (products.json)
//! *                                  - 404 page
//! ```

pub mod actions;
pub mod api;
pub mod auth;
pub mod graphql;
pub mod home;
pub mod webhooks;

use axum::{
    Router,
    http::{StatusCode, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::middleware::{verify_request, verify_request_with_header};
use crate::state::AppState;

/// Directory served under `/_next/static`.
pub const STATIC_DIR: &str = "crates/admin/static";

/// `302 Found` redirect, used by every auth bounce.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Create the OAuth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth::begin))
        .route("/auth/toplevel", get(auth::top_level))
        .route("/auth/callback", get(auth::callback))
}

/// Page action endpoints, called with `fetch` and answered with reauthorize headers.
pub fn action_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/actions/script-tags/create", post(actions::create_script_tag))
        .route("/actions/script-tags/update", post(actions::update_script_tag))
        .route("/actions/script-tags/delete", post(actions::delete_script_tag))
        .route("/actions/rest-test", post(actions::rest_test))
        .route_layer(from_fn_with_state(state.clone(), verify_request_with_header))
}

/// Routes behind the redirecting session check, including the 404 fallback.
pub fn verified_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/products", get(api::products))
        .fallback(home::not_found)
        .layer(from_fn_with_state(state.clone(), verify_request))
}

/// Create all routes for the app.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Page
        .route("/", get(home::index))
        // OAuth
        .merge(auth_routes())
        // Webhooks
        .route("/webhooks", post(webhooks::process))
        // GraphQL proxy
        .route(
            "/graphql",
            post(graphql::proxy)
                .route_layer(from_fn_with_state(state.clone(), verify_request_with_header)),
        )
        // Assets
        .route("/_next/webpack-hmr", get(home::webpack_hmr))
        .nest_service("/_next/static", ServeDir::new(STATIC_DIR))
        // Page actions
        .merge(action_routes(state))
        // Everything else
        .merge(verified_routes(state))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
