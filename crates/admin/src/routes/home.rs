//! The embedded admin page.

use askama::Template;
use axum::{
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sticky_cart_core::{Session, ShopDomain};
use tracing::instrument;

use super::found;
use crate::error::AppError;
use crate::middleware::auth_path;
use crate::shopify::ScriptTag;
use crate::state::AppState;

/// Number of script tags listed on the page.
const SCRIPT_TAG_PAGE_SIZE: i64 = 10;

/// What the page shows for the script-tag query.
#[derive(Debug, Clone)]
pub enum PageView {
    Loading,
    Error(String),
    Ready(Vec<ScriptTag>),
}

/// Admin page template.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub api_key: String,
    pub shop: String,
    pub script_tag_src: String,
    pub view: PageView,
}

/// 404 page template.
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub shop: Option<String>,
}

/// GET / - Render the admin page for an active shop.
///
/// Shops missing from the active-shop table are sent through OAuth first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Response, AppError> {
    let raw_shop = params.shop.unwrap_or_default();

    let active = match ShopDomain::parse(&raw_shop) {
        Ok(shop) => state.active_shops().contains(&shop).await.then_some(shop),
        Err(_) => None,
    };
    let Some(shop) = active else {
        return Ok(found(&auth_path(Some(&raw_shop))));
    };

    let view = load_script_tags(&state, &shop).await;
    if let PageView::Error(message) = &view {
        tracing::warn!(shop = %shop, error = %message, "Script tag query failed");
    }

    let template = IndexTemplate {
        api_key: state.shopify().api_key().to_string(),
        shop: shop.to_string(),
        script_tag_src: state.config().script_tag_src.clone(),
        view,
    };
    Ok(Html(template.render()?).into_response())
}

async fn load_script_tags(state: &AppState, shop: &ShopDomain) -> PageView {
    let session = match state.sessions().load(&Session::offline_id(shop)).await {
        Ok(Some(session)) => session,
        Ok(None) => return PageView::Error(format!("no session for {shop}")),
        Err(e) => return PageView::Error(e.to_string()),
    };

    match state
        .shopify()
        .get_script_tags(&session, SCRIPT_TAG_PAGE_SIZE)
        .await
    {
        Ok(tags) => PageView::Ready(tags),
        Err(e) => PageView::Error(e.to_string()),
    }
}

/// Fallback - 404 page for verified requests to unknown paths.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Result<Response, AppError> {
    let template = NotFoundTemplate {
        path: uri.path().to_string(),
    };
    Ok((StatusCode::NOT_FOUND, Html(template.render()?)).into_response())
}

/// GET /_next/webpack-hmr - Hot reload endpoint, only answered in development.
pub async fn webpack_hmr(State(state): State<AppState>) -> StatusCode {
    if state.config().environment.is_production() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sticky_cart_core::ScriptTagId;

    fn render(view: PageView) -> String {
        IndexTemplate {
            api_key: "api-key".to_string(),
            shop: "store.myshopify.com".to_string(),
            script_tag_src: "https://cdn.example.com/sticky.js".to_string(),
            view,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_render_loading() {
        assert!(render(PageView::Loading).contains("Loading..."));
    }

    #[test]
    fn test_render_error() {
        let html = render(PageView::Error("Throttled".to_string()));
        assert!(html.contains("Error! Throttled"));
        assert!(!html.contains("REST Test"));
    }

    #[test]
    fn test_render_ready() {
        let html = render(PageView::Ready(vec![ScriptTag {
            id: ScriptTagId::from_number(171_016_618_150),
            src: "https://cdn.example.com/sticky.js".to_string(),
        }]));
        assert!(html.contains("171016618150"));
        assert!(html.contains("REST Test"));
        assert!(html.contains("/actions/script-tags/create"));
        assert!(html.contains("/actions/script-tags/delete"));
    }

    #[test]
    fn test_render_not_found() {
        let html = NotFoundTemplate {
            path: "/missing".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("missing"));
    }
}
