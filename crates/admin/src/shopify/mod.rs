//! Shopify Admin API client and request-signing helpers.
//!
//! # Security
//!
//! **The access tokens handled here are HIGH PRIVILEGE.** They grant the app's
//! configured scopes on each installed shop and are only ever sent to
//! `https://<shop>` origins validated as `*.myshopify.com`.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe GraphQL queries
//! - Raw pass-through for the `/graphql` proxy and the REST sample
//! - One client for all shops; the shop and token come from the session
//!
//! # Example
//!
//! ```rust,ignore
//! use sticky_cart_admin::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify);
//!
//! // List script tags installed on the session's shop
//! let tags = client.get_script_tags(&session, 10).await?;
//!
//! // Install the storefront script
//! client.create_script_tag(&session, &config.script_tag_src).await?;
//! ```

mod admin;
pub mod hmac;
pub mod session_token;
pub mod types;

pub use admin::{AdminClient, ProxiedResponse};
pub use admin::oauth::AccessTokenResponse;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// The session has no access token.
    #[error("No access token for shop {0}")]
    NoAccessToken(String),

    /// The session's shop is not a valid shop domain.
    #[error("Invalid shop: {0}")]
    InvalidShop(String),

    /// OAuth token exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Non-success HTTP status from a REST endpoint.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
