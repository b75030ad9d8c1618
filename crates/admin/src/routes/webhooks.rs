//! Inbound webhook endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::state::AppState;

/// POST /webhooks - Verify and dispatch a Shopify webhook delivery.
#[instrument(skip_all)]
pub async fn process(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let result = state
        .webhooks()
        .process(state.shopify().api_secret(), &headers, body)
        .await;

    match result {
        Ok(topic) => {
            tracing::info!(%topic, "Webhook processed, returned status code 200");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            let status = e.status();
            tracing::warn!(error = %e, status = status.as_u16(), "Failed to process webhook");
            (status, e.to_string()).into_response()
        }
    }
}
