//! HTTP middleware for the app server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. `CookieManagerLayer` (signed session cookies)
//! 4. Session verification, per route group:
//!    - [`verify_request`] on `/api/products` and the 404 fallback
//!    - [`verify_request_with_header`] on `/graphql` and `/actions/*`

pub mod session;
pub mod verify;

pub use verify::{CurrentSession, auth_path, verify_request, verify_request_with_header};
