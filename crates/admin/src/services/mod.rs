//! Application services shared by the route handlers.
//!
//! # Services
//!
//! - `active_shops` - In-memory table of shops that completed OAuth
//! - `webhooks` - Signature-verified webhook dispatch

pub mod active_shops;
pub mod webhooks;

pub use active_shops::ActiveShops;
pub use webhooks::{
    AppUninstalledHandler, WebhookDelivery, WebhookError, WebhookHandler, WebhookRegistry,
    WebhookTopic,
};
