//! HTTP route handlers for the companion API.

pub mod export;
pub mod health;
pub mod messages;
pub mod prompts;
pub mod scroll;
pub mod themes;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use chatpro_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(export::routes())
        .merge(prompts::routes())
        .merge(themes::routes())
        .merge(messages::routes())
        .merge(scroll::routes())
}

/// A host page snapshot as posted by the page script.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    pub html: String,
    pub hostname: String,
}

/// Map a core error to a status code and `{ "error": ... }` body.
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::PrintWindow(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if err.is_user_facing() {
        warn!("{}", err);
    } else {
        error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}
