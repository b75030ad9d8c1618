//! Integration test support for Sticky Cart.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (Admin API mocked with mockito)
//! cargo test -p sticky-cart-integration-tests
//!
//! # Live tests, against a Redis server and a running app
//! REDIS_URL=redis://127.0.0.1:6379 APP_BASE_URL=http://localhost:8081 \
//!     cargo test -p sticky-cart-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `router` - Full router driven with `tower::ServiceExt::oneshot`
//! - `redis_session_storage` - Session cache against a live Redis
//! - `live_server` - HTTP checks against a running app

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Response, header},
};
use secrecy::SecretString;
use sticky_cart_admin::config::{AppConfig, Environment, SessionBackend, ShopifyAppConfig};
use sticky_cart_admin::routes;
use sticky_cart_admin::shopify::AdminClient;
use sticky_cart_admin::state::AppState;
use sticky_cart_admin::storage::{MemorySessionStorage, SessionStorage};
use sticky_cart_core::{AuthScopes, Session, ShopDomain};
use tower_cookies::CookieManagerLayer;

/// Shop used throughout the tests.
pub const SHOP: &str = "store.myshopify.com";
pub const API_KEY: &str = "integration-api-key";
pub const API_SECRET: &str = "integration-api-secret-9f2c41d7";
pub const SCOPES: &str = "write_script_tags";
pub const API_VERSION: &str = "2020-10";
pub const ACCESS_TOKEN: &str = "shpat_integration";

/// Admin API GraphQL path for the test API version.
#[must_use]
pub fn graphql_path() -> String {
    format!("/admin/api/{API_VERSION}/graphql.json")
}

#[must_use]
pub fn shop() -> ShopDomain {
    ShopDomain::parse(SHOP).unwrap()
}

#[must_use]
pub fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1".parse().unwrap(),
        port: 8081,
        host_name: "sticky-cart.test".to_string(),
        environment,
        shopify: ShopifyAppConfig {
            api_key: API_KEY.to_string(),
            api_secret: SecretString::from(API_SECRET),
            scopes: AuthScopes::parse(SCOPES),
            api_version: API_VERSION.to_string(),
        },
        session_backend: SessionBackend::Memory,
        script_tag_src: "https://cdn.sticky-cart.test/sticky-atc.js".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Router plus the state it shares, with every Admin API call sent to `admin_url`.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    #[must_use]
    pub fn new(admin_url: &str) -> Self {
        Self::with_environment(admin_url, Environment::Development)
    }

    #[must_use]
    pub fn with_environment(admin_url: &str, environment: Environment) -> Self {
        let config = test_config(environment);
        let client = AdminClient::with_base_url(&config.shopify, admin_url);
        let sessions: Arc<dyn SessionStorage> = Arc::new(MemorySessionStorage::new());
        let state = AppState::with_client(config, sessions, client);
        let router = routes::routes(&state)
            .layer(CookieManagerLayer::new())
            .with_state(state.clone());
        Self { state, router }
    }

    /// Store a completed offline session for [`SHOP`].
    pub async fn install_session(&self) -> Session {
        let mut session = Session::begin_offline(&shop(), "123456789012345");
        session.complete(ACCESS_TOKEN, SCOPES);
        self.state.sessions().store(&session).await.unwrap();
        session
    }

    /// Store a session and mark [`SHOP`] active.
    pub async fn install(&self) -> Session {
        let session = self.install_session().await;
        self.state
            .active_shops()
            .insert(shop(), SCOPES.to_string())
            .await;
        session
    }
}

/// Collect `Set-Cookie` headers into a `Cookie` request header value.
///
/// Removal cookies (empty value) are skipped.
#[must_use]
pub fn cookie_header<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// `Location` header of a redirect.
#[must_use]
pub fn location<B>(response: &Response<B>) -> String {
    header_str(response.headers(), header::LOCATION.as_str())
}

#[must_use]
pub fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Read a response body to a string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// App Bridge session token for [`SHOP`], signed with the test secret.
#[must_use]
pub fn session_token() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = serde_json::json!({
        "iss": format!("https://{SHOP}/admin"),
        "dest": format!("https://{SHOP}"),
        "aud": API_KEY,
        "sub": "42",
        "exp": now + 60,
        "nbf": now - 1,
        "iat": now - 1,
    });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(API_SECRET.as_bytes()),
    )
    .unwrap()
}
