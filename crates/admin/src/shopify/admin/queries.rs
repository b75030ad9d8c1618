//! GraphQL query definitions for Shopify Admin API.
//!
//! Uses `graphql_client` to generate type-safe Rust code from GraphQL queries.

use graphql_client::GraphQLQuery;

// =============================================================================
// Custom scalar type aliases (used by graphql_client)
// =============================================================================

/// URL string.
#[allow(clippy::upper_case_acronyms)]
type URL = String;

// =============================================================================
// Shop queries
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/shop.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetShop;

// =============================================================================
// Script tag queries
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/script_tags.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetScriptTags;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/script_tags.graphql",
    response_derives = "Debug, Clone"
)]
pub struct ScriptTagCreate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/script_tags.graphql",
    response_derives = "Debug, Clone"
)]
pub struct ScriptTagUpdate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/script_tags.graphql",
    response_derives = "Debug, Clone"
)]
pub struct ScriptTagDelete;

// =============================================================================
// Webhook subscription queries
// =============================================================================

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/webhooks.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetWebhookSubscriptions;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/webhooks.graphql",
    response_derives = "Debug, Clone"
)]
pub struct WebhookSubscriptionCreate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/admin/schema.graphql",
    query_path = "graphql/admin/queries/webhooks.graphql",
    response_derives = "Debug, Clone"
)]
pub struct WebhookSubscriptionUpdate;
