//! Theme catalog and selection routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use chatpro_browser::apply_theme;
use chatpro_store::{theme_by_id, THEMES};

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/themes", get(list_themes))
        .route("/themes/selected", get(get_selected).put(select_theme))
}

#[derive(Debug, Deserialize)]
struct SelectThemeRequest {
    id: String,
}

async fn list_themes() -> Json<serde_json::Value> {
    Json(serde_json::json!(THEMES))
}

/// Selected id, resolved theme and the style elements to inject.
fn selection(state: &AppState, id: &str) -> serde_json::Value {
    let styles = state.styles.read();
    serde_json::json!({
        "id": id,
        "theme": theme_by_id(id),
        "styles": styles.sheets(),
        "html": styles.render(),
    })
}

async fn get_selected(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.theme.selected() {
        Ok(id) => (StatusCode::OK, Json(selection(&state, &id))),
        Err(e) => error_response(e),
    }
}

async fn select_theme(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectThemeRequest>,
) -> impl IntoResponse {
    if let Err(e) = state.theme.select(&req.id) {
        return error_response(e);
    }
    apply_theme(&mut state.styles.write(), theme_by_id(&req.id));
    (StatusCode::OK, Json(selection(&state, &req.id)))
}
