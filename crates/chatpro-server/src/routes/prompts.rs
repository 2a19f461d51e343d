//! Saved prompt routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;

use chatpro_store::Prompt;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompts", get(list_prompts).post(save_prompt))
        .route("/prompts/{id}", delete(delete_prompt))
}

/// New prompt, or an edit of an existing one when `id` is given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavePromptRequest {
    id: Option<String>,
    title: String,
    content: String,
    created_at: Option<i64>,
}

impl SavePromptRequest {
    fn into_prompt(self) -> Prompt {
        let mut prompt = Prompt::new(self.title, self.content);
        if let Some(id) = self.id {
            prompt.id = id;
        }
        if let Some(created_at) = self.created_at {
            prompt.created_at = created_at;
        }
        prompt
    }
}

async fn list_prompts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.prompts.list() {
        Ok(prompts) => (StatusCode::OK, Json(serde_json::json!(prompts))),
        Err(e) => error_response(e),
    }
}

async fn save_prompt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SavePromptRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Title and content are required" })),
        );
    }

    let prompt = req.into_prompt();
    match state.prompts.save(prompt.clone()) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!(prompt))),
        Err(e) => error_response(e),
    }
}

async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.prompts.delete(&id) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "success": true }))),
        Err(e) => error_response(e),
    }
}
