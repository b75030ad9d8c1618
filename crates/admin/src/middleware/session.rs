//! Signed cookies carrying the OAuth session id.
//!
//! The app runs inside the Shopify admin iframe, so both cookies are
//! `SameSite=None; Secure`. Values are signed with a key derived from the API
//! secret; a tampered cookie reads as absent.

use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies, Key};

/// Cookie holding the current session id.
pub const SESSION_COOKIE_NAME: &str = "shopify_app_session";

/// Cookie proving the browser reached `/auth` as a top-level window.
pub const TOP_LEVEL_OAUTH_COOKIE_NAME: &str = "shopify_top_level_oauth";

/// Lifetime of the top-level marker; long enough to finish one handshake.
const TOP_LEVEL_OAUTH_MAX_AGE_SECONDS: i64 = 60;

fn build_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::None)
        .build()
}

/// Remember the session id for subsequent requests.
pub fn set_session_id(cookies: &Cookies, key: &Key, session_id: &str) {
    cookies
        .signed(key)
        .add(build_cookie(SESSION_COOKIE_NAME, session_id.to_string()));
}

/// Read the session id, if the cookie is present and correctly signed.
#[must_use]
pub fn session_id(cookies: &Cookies, key: &Key) -> Option<String> {
    cookies
        .signed(key)
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Mark the browser as having opened `/auth` in the top window.
pub fn set_top_level_oauth(cookies: &Cookies, key: &Key) {
    let mut cookie = build_cookie(TOP_LEVEL_OAUTH_COOKIE_NAME, "1".to_string());
    cookie.set_max_age(Duration::seconds(TOP_LEVEL_OAUTH_MAX_AGE_SECONDS));
    cookies.signed(key).add(cookie);
}

#[must_use]
pub fn has_top_level_oauth(cookies: &Cookies, key: &Key) -> bool {
    cookies.signed(key).get(TOP_LEVEL_OAUTH_COOKIE_NAME).is_some()
}

/// Drop the top-level marker once the handshake has started.
pub fn clear_top_level_oauth(cookies: &Cookies) {
    cookies.remove(Cookie::build(TOP_LEVEL_OAUTH_COOKIE_NAME).path("/").build());
}
