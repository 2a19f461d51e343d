//! Runtime messages from the extension UI, applied to a page snapshot.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use chatpro_browser::{handle_message, resolve_site, Page, RuntimeMessage};

use super::{error_response, PageSnapshot};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/messages", post(post_message))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRequest {
    #[serde(flatten)]
    message: RuntimeMessage,
    #[serde(flatten)]
    page: PageSnapshot,
    selection_start: Option<usize>,
    selection_end: Option<usize>,
}

/// POST /api/messages: `INSERT_PROMPT` returns the input's new value.
async fn post_message(Json(req): Json<MessageRequest>) -> impl IntoResponse {
    let site = resolve_site(&req.page.hostname);
    let selection = req
        .selection_start
        .map(|start| (start, req.selection_end.unwrap_or(start)));

    let handled = {
        let page = Page::parse(&req.page.html);
        handle_message(&req.message, &page, site, selection)
    };

    match handled {
        Ok((response, field)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": response.success,
                "value": field.value(),
                "field": field,
            })),
        ),
        Err(e) => error_response(e),
    }
}
