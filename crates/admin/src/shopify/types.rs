//! Domain types returned by the Admin API client.

use serde::Serialize;
use sticky_cart_core::{ScriptTagId, WebhookSubscriptionId};

/// A script tag installed on a shop's storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptTag {
    /// Global ID.
    pub id: ScriptTagId,
    /// Script URL.
    pub src: String,
}

/// A user-facing error returned by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserError {
    /// Input field path the error refers to.
    pub field: Vec<String>,
    /// Error message.
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field.join("."), self.message)
        }
    }
}

/// Join mutation user errors into a single message.
#[must_use]
pub fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An existing webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSubscription {
    /// Global ID.
    pub id: WebhookSubscriptionId,
    /// Delivery URL.
    pub callback_url: String,
}

/// Outcome of registering a webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookRegistration {
    /// A subscription already pointed at the callback URL.
    AlreadyRegistered,
    /// A new subscription was created.
    Created(WebhookSubscriptionId),
    /// An existing subscription was pointed at the callback URL.
    Updated(WebhookSubscriptionId),
}
