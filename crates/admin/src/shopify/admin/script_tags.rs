//! Script tag management operations for the Admin API.

use sticky_cart_core::{ScriptTagId, Session};
use tracing::instrument;

use super::{
    AdminClient, AdminShopifyError, check_user_errors,
    queries::{
        GetScriptTags, ScriptTagCreate, ScriptTagDelete, ScriptTagUpdate, get_script_tags,
        script_tag_create, script_tag_delete, script_tag_update,
    },
};
use crate::shopify::types::ScriptTag;

fn parse_id(id: &str) -> Result<ScriptTagId, AdminShopifyError> {
    ScriptTagId::parse(id).map_err(|e| AdminShopifyError::UserError(e.to_string()))
}

impl AdminClient {
    /// List the script tags installed on the session's shop.
    ///
    /// # Arguments
    ///
    /// * `session` - Active session for the shop
    /// * `first` - Maximum number of script tags to return
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_script_tags(
        &self,
        session: &Session,
        first: i64,
    ) -> Result<Vec<ScriptTag>, AdminShopifyError> {
        let variables = get_script_tags::Variables { first };
        let response = self.execute::<GetScriptTags>(session, variables).await?;

        response
            .script_tags
            .edges
            .into_iter()
            .map(|edge| {
                Ok(ScriptTag {
                    id: parse_id(&edge.node.id)?,
                    src: edge.node.src,
                })
            })
            .collect()
    }

    /// Install a script tag loading `src` on the shop's storefront.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserError` if Shopify rejects the input.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn create_script_tag(
        &self,
        session: &Session,
        src: &str,
    ) -> Result<ScriptTag, AdminShopifyError> {
        let variables = script_tag_create::Variables {
            input: script_tag_create::ScriptTagInput {
                src: Some(src.to_string()),
            },
        };

        let response = self.execute::<ScriptTagCreate>(session, variables).await?;
        let payload = response.script_tag_create.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagCreate returned no payload".to_string())
        })?;

        check_user_errors(payload.user_errors.into_iter().map(|e| (e.field, e.message)))?;

        let tag = payload.script_tag.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagCreate returned no script tag".to_string())
        })?;

        Ok(ScriptTag {
            id: parse_id(&tag.id)?,
            src: tag.src,
        })
    }

    /// Point an existing script tag at a new `src`.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserError` if the tag does not exist or
    /// the input is rejected.
    #[instrument(skip(self, session), fields(shop = %session.shop, id = %id))]
    pub async fn update_script_tag(
        &self,
        session: &Session,
        id: &ScriptTagId,
        src: &str,
    ) -> Result<ScriptTag, AdminShopifyError> {
        let variables = script_tag_update::Variables {
            id: id.to_string(),
            input: script_tag_update::ScriptTagInput {
                src: Some(src.to_string()),
            },
        };

        let response = self.execute::<ScriptTagUpdate>(session, variables).await?;
        let payload = response.script_tag_update.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagUpdate returned no payload".to_string())
        })?;

        check_user_errors(payload.user_errors.into_iter().map(|e| (e.field, e.message)))?;

        let tag = payload.script_tag.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagUpdate returned no script tag".to_string())
        })?;

        Ok(ScriptTag {
            id: parse_id(&tag.id)?,
            src: tag.src,
        })
    }

    /// Remove a script tag, returning the deleted ID.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserError` if the tag does not exist.
    #[instrument(skip(self, session), fields(shop = %session.shop, id = %id))]
    pub async fn delete_script_tag(
        &self,
        session: &Session,
        id: &ScriptTagId,
    ) -> Result<ScriptTagId, AdminShopifyError> {
        let variables = script_tag_delete::Variables { id: id.to_string() };

        let response = self.execute::<ScriptTagDelete>(session, variables).await?;
        let payload = response.script_tag_delete.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagDelete returned no payload".to_string())
        })?;

        check_user_errors(payload.user_errors.into_iter().map(|e| (e.field, e.message)))?;

        let deleted = payload.deleted_script_tag_id.ok_or_else(|| {
            AdminShopifyError::UserError("scriptTagDelete returned no ID".to_string())
        })?;

        parse_id(&deleted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::tests::{active_session, test_config};
    use super::*;

    const ENDPOINT: &str = "/admin/api/2020-10/graphql.json";

    #[tokio::test]
    async fn test_get_script_tags() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "operationName": "GetScriptTags",
                "variables": { "first": 10 },
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"scriptTags":{"edges":[
                    {"node":{"id":"gid://shopify/ScriptTag/1","src":"https://cdn.example.com/a.js"}},
                    {"node":{"id":"gid://shopify/ScriptTag/2","src":"https://cdn.example.com/b.js"}}
                ]}}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let tags = client.get_script_tags(&active_session(), 10).await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id.number(), Some(1));
        assert_eq!(tags[1].src, "https://cdn.example.com/b.js");
    }

    #[tokio::test]
    async fn test_create_script_tag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "variables": { "input": { "src": "https://cdn.example.com/cart.js" } },
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"scriptTagCreate":{
                    "scriptTag":{"id":"gid://shopify/ScriptTag/7","src":"https://cdn.example.com/cart.js"},
                    "userErrors":[]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let tag = client
            .create_script_tag(&active_session(), "https://cdn.example.com/cart.js")
            .await
            .unwrap();

        assert_eq!(tag.id, ScriptTagId::from_number(7));
    }

    #[tokio::test]
    async fn test_update_script_tag_user_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .with_status(200)
            .with_body(
                r#"{"data":{"scriptTagUpdate":{
                    "scriptTag":null,
                    "userErrors":[{"field":["id"],"message":"Script tag does not exist"}]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let err = client
            .update_script_tag(
                &active_session(),
                &ScriptTagId::from_number(99),
                "https://cdn.example.com/v2.js",
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User error: id: Script tag does not exist");
    }

    #[tokio::test]
    async fn test_delete_script_tag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "variables": { "id": "gid://shopify/ScriptTag/7" },
            })))
            .with_status(200)
            .with_body(
                r#"{"data":{"scriptTagDelete":{
                    "deletedScriptTagId":"gid://shopify/ScriptTag/7",
                    "userErrors":[]
                }}}"#,
            )
            .create_async()
            .await;

        let client = AdminClient::with_base_url(&test_config(), server.url());
        let deleted = client
            .delete_script_tag(&active_session(), &ScriptTagId::from_number(7))
            .await
            .unwrap();

        assert_eq!(deleted.number(), Some(7));
    }
}
