//! JSON API endpoints for the embedded page.

use axum::{Extension, Json, extract::State};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// GET /api/products - REST sample, relays the shop's `products.json`.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn products(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Result<Json<serde_json::Value>, AppError> {
    let body = state.shopify().get_products_rest(&session).await?;
    Ok(Json(body))
}
