//! Webhook subscription registration for the Admin API.

use sticky_cart_core::{Session, WebhookSubscriptionId};
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError, check_user_errors,
    queries::{
        GetWebhookSubscriptions, WebhookSubscriptionCreate, WebhookSubscriptionUpdate,
        get_webhook_subscriptions, webhook_subscription_create, webhook_subscription_update,
    },
};
use crate::shopify::types::{WebhookRegistration, WebhookSubscription};

fn parse_id(id: &str) -> Result<WebhookSubscriptionId, AdminShopifyError> {
    WebhookSubscriptionId::parse(id).map_err(|e| AdminShopifyError::UserError(e.to_string()))
}

impl AdminClient {
    /// Find the existing subscription for a topic, if any.
    ///
    /// `topic` is the GraphQL enum name, e.g. `APP_UNINSTALLED`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_webhook_subscription(
        &self,
        session: &Session,
        topic: &str,
    ) -> Result<Option<WebhookSubscription>, AdminShopifyError> {
        use get_webhook_subscriptions::{Variables, WebhookSubscriptionTopic};

        let topic = match topic {
            "APP_UNINSTALLED" => WebhookSubscriptionTopic::APP_UNINSTALLED,
            other => WebhookSubscriptionTopic::Other(other.to_string()),
        };
        let variables = Variables {
            topics: vec![topic],
        };

        let response = self
            .execute::<GetWebhookSubscriptions>(session, variables)
            .await?;

        response
            .webhook_subscriptions
            .edges
            .into_iter()
            .next()
            .map(|edge| {
                Ok(WebhookSubscription {
                    id: parse_id(&edge.node.id)?,
                    callback_url: edge.node.callback_url,
                })
            })
            .transpose()
    }

    /// Make sure the shop delivers `topic` to `callback_url` as JSON.
    ///
    /// Creates the subscription if none exists, repoints it if the callback
    /// URL changed, and leaves it alone otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserError` if Shopify rejects the
    /// subscription, or another error if a request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn register_webhook(
        &self,
        session: &Session,
        topic: &str,
        callback_url: &str,
    ) -> Result<WebhookRegistration, AdminShopifyError> {
        match self.get_webhook_subscription(session, topic).await? {
            Some(existing) if existing.callback_url == callback_url => {
                Ok(WebhookRegistration::AlreadyRegistered)
            }
            Some(existing) => {
                let id = self
                    .update_webhook_subscription(session, &existing.id, callback_url)
                    .await?;
                Ok(WebhookRegistration::Updated(id))
            }
            None => {
                let id = self
                    .create_webhook_subscription(session, topic, callback_url)
                    .await?;
                Ok(WebhookRegistration::Created(id))
            }
        }
    }

    async fn create_webhook_subscription(
        &self,
        session: &Session,
        topic: &str,
        callback_url: &str,
    ) -> Result<WebhookSubscriptionId, AdminShopifyError> {
        use webhook_subscription_create::{
            Variables, WebhookSubscriptionFormat, WebhookSubscriptionInput,
            WebhookSubscriptionTopic,
        };

        let topic = match topic {
            "APP_UNINSTALLED" => WebhookSubscriptionTopic::APP_UNINSTALLED,
            other => WebhookSubscriptionTopic::Other(other.to_string()),
        };
        let variables = Variables {
            topic,
            webhook_subscription: WebhookSubscriptionInput {
                callback_url: Some(callback_url.to_string()),
                format: Some(WebhookSubscriptionFormat::JSON),
            },
        };

        let response = self
            .execute::<WebhookSubscriptionCreate>(session, variables)
            .await?;
        let payload = response.webhook_subscription_create.ok_or_else(|| {
            AdminShopifyError::UserError(
                "webhookSubscriptionCreate returned no payload".to_string(),
            )
        })?;

        check_user_errors(payload.user_errors.into_iter().map(|e| (e.field, e.message)))?;

        let subscription = payload.webhook_subscription.ok_or_else(|| {
            AdminShopifyError::UserError(
                "webhookSubscriptionCreate returned no subscription".to_string(),
            )
        })?;
        parse_id(&subscription.id)
    }

    async fn update_webhook_subscription(
        &self,
        session: &Session,
        id: &WebhookSubscriptionId,
        callback_url: &str,
    ) -> Result<WebhookSubscriptionId, AdminShopifyError> {
        use webhook_subscription_update::{
            Variables, WebhookSubscriptionFormat, WebhookSubscriptionInput,
        };

        let variables = Variables {
            id: id.to_string(),
            webhook_subscription: WebhookSubscriptionInput {
                callback_url: Some(callback_url.to_string()),
                format: Some(WebhookSubscriptionFormat::JSON),
            },
        };

        let response = self
            .execute::<WebhookSubscriptionUpdate>(session, variables)
            .await?;
        let payload = response.webhook_subscription_update.ok_or_else(|| {
            AdminShopifyError::UserError(
                "webhookSubscriptionUpdate returned no payload".to_string(),
            )
        })?;

        check_user_errors(payload.user_errors.into_iter().map(|e| (e.field, e.message)))?;

        let subscription = payload.webhook_subscription.ok_or_else(|| {
            AdminShopifyError::UserError(
                "webhookSubscriptionUpdate returned no subscription".to_string(),
            )
        })?;
        parse_id(&subscription.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{active_session, test_config};
    use super::*;
    use mockito::Matcher;

    const ENDPOINT: &str = "/admin/api/2020-10/graphql.json";
    const CALLBACK: &str = "https://app.example.com/webhooks";

    fn lookup_matcher() -> Matcher {
        Matcher::PartialJson(serde_json::json!({
            "operationName": "GetWebhookSubscriptions",
            "variables": { "topics": ["APP_UNINSTALLED"] },
        }))
    }

    #[tokio::test]
    async fn test_register_creates_missing_subscription() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(lookup_matcher())
            .with_status(200)
            .with_body(r#"{"data":{"webhookSubscriptions":{"edges":[]}}}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", ENDPOINT)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "operationName": "WebhookSubscriptionCreate",
                "variables": {
                    "topic": "APP_UNINSTALLED",
                    "webhookSubscription": { "callbackUrl": CALLBACK, "format": "JSON" },
                },
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"webhookSubscriptionCreate":{
                    "webhookSubscription":{"id":"gid://shopify/WebhookSubscription/5"},
                    "userErrors":[]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let outcome = client
            .register_webhook(&active_session(), "APP_UNINSTALLED", CALLBACK)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookRegistration::Created(WebhookSubscriptionId::from_number(5))
        );
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_skips_matching_subscription() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(lookup_matcher())
            .with_status(200)
            .with_body(format!(
                r#"{{"data":{{"webhookSubscriptions":{{"edges":[
                    {{"node":{{"id":"gid://shopify/WebhookSubscription/5","callbackUrl":"{CALLBACK}"}}}}
                ]}}}}}}"#
            ))
            .expect(1)
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let outcome = client
            .register_webhook(&active_session(), "APP_UNINSTALLED", CALLBACK)
            .await
            .unwrap();

        assert_eq!(outcome, WebhookRegistration::AlreadyRegistered);
    }

    #[tokio::test]
    async fn test_register_updates_stale_callback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(lookup_matcher())
            .with_status(200)
            .with_body(
                r#"{"data":{"webhookSubscriptions":{"edges":[
                    {"node":{"id":"gid://shopify/WebhookSubscription/5","callbackUrl":"https://old.example.com/webhooks"}}
                ]}}}"#,
            )
            .create_async()
            .await;
        server
            .mock("POST", ENDPOINT)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "operationName": "WebhookSubscriptionUpdate",
                "variables": { "id": "gid://shopify/WebhookSubscription/5" },
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"webhookSubscriptionUpdate":{
                    "webhookSubscription":{"id":"gid://shopify/WebhookSubscription/5"},
                    "userErrors":[]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let outcome = client
            .register_webhook(&active_session(), "APP_UNINSTALLED", CALLBACK)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookRegistration::Updated(WebhookSubscriptionId::from_number(5))
        );
    }

    #[tokio::test]
    async fn test_register_surfaces_user_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(lookup_matcher())
            .with_status(200)
            .with_body(r#"{"data":{"webhookSubscriptions":{"edges":[]}}}"#)
            .create_async()
            .await;
        server
            .mock("POST", ENDPOINT)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "operationName": "WebhookSubscriptionCreate",
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"webhookSubscriptionCreate":{
                    "webhookSubscription":null,
                    "userErrors":[{"field":["webhookSubscription","callbackUrl"],"message":"Address is invalid"}]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let err = client
            .register_webhook(&active_session(), "APP_UNINSTALLED", CALLBACK)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminShopifyError::UserError(_)));
        assert!(err.to_string().contains("webhookSubscription.callbackUrl"));
    }
}
