//! Export routes: extracted messages, printable HTML and Word documents.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use chatpro_browser::extract::no_conversation_message;
use chatpro_browser::{extract_messages, resolve_site, Page, SiteConfig};
use chatpro_core::{ChatMessage, Error, Result};
use chatpro_export::{docx_filename, render_docx, render_printable_html, HtmlOptions};

use super::{error_response, PageSnapshot};
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ---------------------------------------------------------------
// Route builder
// ---------------------------------------------------------------

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export/messages", post(export_messages))
        .route("/export/html", post(export_html))
        .route("/export/docx", post(export_docx))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HtmlExportRequest {
    #[serde(flatten)]
    page: PageSnapshot,
    #[serde(default)]
    auto_print: bool,
}

/// Extract messages, failing with the user-facing message when none exist.
fn conversation(snapshot: &PageSnapshot) -> Result<(&'static SiteConfig, Vec<ChatMessage>)> {
    let site = resolve_site(&snapshot.hostname);
    let page = Page::parse(&snapshot.html);
    let messages = extract_messages(&page, site)?.require_messages(site)?;
    Ok((site, messages))
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

/// POST /api/export/messages: the conversation as structured messages.
async fn export_messages(Json(req): Json<PageSnapshot>) -> impl IntoResponse {
    let site = resolve_site(&req.hostname);
    let extraction = {
        let page = Page::parse(&req.html);
        extract_messages(&page, site)
    };

    match extraction {
        Ok(extraction) if !extraction.is_empty() => (
            StatusCode::OK,
            Json(serde_json::json!({
                "site": extraction.site,
                "siteName": site.name,
                "strategy": extraction.strategy,
                "degraded": extraction.is_degraded(),
                "messages": extraction.messages,
            })),
        ),
        Ok(_) => error_response(Error::NotFound(no_conversation_message(site.name))),
        Err(e) => error_response(e),
    }
}

/// POST /api/export/html: standalone printable page.
async fn export_html(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HtmlExportRequest>,
) -> Response {
    tokio::time::sleep(state.config.export_delay).await;

    let (site, messages) = match conversation(&req.page) {
        Ok(found) => found,
        Err(e) => return error_response(e).into_response(),
    };
    let options = HtmlOptions {
        auto_print: req.auto_print,
        print_delay: state.config.print_settle_delay,
    };
    let html = render_printable_html(&messages, site.name, options);
    info!("Exported {} {} messages as HTML", messages.len(), site.name);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

/// POST /api/export/docx: Word document download.
async fn export_docx(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PageSnapshot>,
) -> Response {
    tokio::time::sleep(state.config.export_delay).await;

    let (site, messages) = match conversation(&req) {
        Ok(found) => found,
        Err(e) => return error_response(e).into_response(),
    };
    let count = messages.len();
    let site_name = site.name;

    let packed = tokio::task::spawn_blocking(move || render_docx(&messages, site_name))
        .await
        .map_err(|e| Error::Export(format!("docx task failed: {}", e)))
        .and_then(|result| result);
    let bytes = match packed {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e).into_response(),
    };

    let filename = docx_filename(site_name, Utc::now().date_naive());
    info!("Exported {} {} messages as {}", count, site_name, filename);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
