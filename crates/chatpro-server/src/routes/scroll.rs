//! Scroll-to-top/bottom: locate the container and return the script to run.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use chatpro_browser::{locate_scroll_container, resolve_site, scroll_script, Page, ScrollDirection};

use super::{error_response, PageSnapshot};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/scroll", post(scroll))
}

#[derive(Debug, Deserialize)]
struct ScrollRequest {
    #[serde(flatten)]
    page: PageSnapshot,
    direction: ScrollDirection,
}

async fn scroll(Json(req): Json<ScrollRequest>) -> impl IntoResponse {
    let site = resolve_site(&req.page.hostname);
    let located = {
        let page = Page::parse(&req.page.html);
        locate_scroll_container(&page, site)
    };

    match located {
        Ok(container) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "strategy": container.strategy,
                "path": container.path,
                "isRoot": container.is_root,
                "script": scroll_script(&container, req.direction),
            })),
        ),
        Err(e) => error_response(e),
    }
}
