//! Fire-and-forget action buttons on the admin page.
//!
//! Each action performs one Admin API call, logs the outcome and answers
//! `204 No Content`, leaving the browser on the page.

use axum::{Extension, Form, extract::State, http::StatusCode};
use serde::Deserialize;
use sticky_cart_core::ScriptTagId;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateScriptTagForm {
    pub id: String,
    /// Defaults to the configured script.
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteScriptTagForm {
    pub id: String,
}

fn parse_id(id: &str) -> Result<ScriptTagId, AppError> {
    ScriptTagId::parse(id.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid script tag id: {e}")))
}

/// POST /actions/script-tags/create
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn create_script_tag(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> StatusCode {
    let src = &state.config().script_tag_src;
    match state.shopify().create_script_tag(&session, src).await {
        Ok(tag) => tracing::info!(id = %tag.id, src = %tag.src, "Script tag created"),
        Err(e) => tracing::error!(error = %e, "Script tag create failed"),
    }
    StatusCode::NO_CONTENT
}

/// POST /actions/script-tags/update
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn update_script_tag(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Form(form): Form<UpdateScriptTagForm>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&form.id)?;
    let src = form
        .src
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config().script_tag_src.clone());

    match state.shopify().update_script_tag(&session, &id, &src).await {
        Ok(tag) => tracing::info!(id = %tag.id, src = %tag.src, "Script tag updated"),
        Err(e) => tracing::error!(id = %id, error = %e, "Script tag update failed"),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /actions/script-tags/delete
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn delete_script_tag(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Form(form): Form<DeleteScriptTagForm>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&form.id)?;

    match state.shopify().delete_script_tag(&session, &id).await {
        Ok(deleted) => tracing::info!(id = %deleted, "Script tag deleted"),
        Err(e) => tracing::error!(id = %id, error = %e, "Script tag delete failed"),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /actions/rest-test - Exercise the REST sample endpoint.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn rest_test(
    State(state): State<AppState>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> StatusCode {
    match state.shopify().get_products_rest(&session).await {
        Ok(body) => {
            let count = body["products"].as_array().map_or(0, Vec::len);
            tracing::info!(count, "REST products fetched");
        }
        Err(e) => tracing::error!(error = %e, "REST products fetch failed"),
    }
    StatusCode::NO_CONTENT
}
