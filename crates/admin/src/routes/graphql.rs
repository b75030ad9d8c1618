//! Admin API GraphQL proxy for the embedded page.

use axum::{
    Extension,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// POST /graphql - Forward the body to the shop's Admin API.
///
/// Runs behind the header-variant session check; the upstream status and
/// body are relayed unchanged.
#[instrument(skip_all)]
pub async fn proxy(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    body: Bytes,
) -> Result<Response, AppError> {
    let upstream = state.shopify().proxy_graphql(&session, body).await?;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut response = (status, upstream.body).into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}
