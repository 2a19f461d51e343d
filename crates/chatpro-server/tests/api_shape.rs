//! API shape tests: drive the router in-process and check the JSON the page
//! script and popup depend on.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use chatpro_core::ChatProConfig;
use chatpro_server::{build_router, AppState};
use chatpro_store::MemoryStore;

const CHATGPT_PAGE: &str = r#"<html><body><main>
    <div data-message-author-role="user"><p>Show me a loop</p></div>
    <div data-message-author-role="assistant"><p>Here:</p><pre><code class="language-rust">for i in 0..3 {}</code></pre></div>
</main></body></html>"#;

fn app() -> (tempfile::TempDir, Router) {
    app_with(|_| {})
}

fn app_with(configure: impl FnOnce(&mut ChatProConfig)) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ChatProConfig::from_env(dir.path()).unwrap();
    config.export_delay = Duration::ZERO;
    configure(&mut config);
    let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::new())));
    (dir, build_router(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_shape() {
    let (_dir, app) = app();
    let (status, body) = send_json(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

/// { site, siteName, strategy, degraded, messages: [{ role, content }] }
#[tokio::test]
async fn test_export_messages_shape() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/export/messages",
        Some(serde_json::json!({ "html": CHATGPT_PAGE, "hostname": "chatgpt.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site"], "chatgpt");
    assert_eq!(body["siteName"], "ChatGPT");
    assert_eq!(body["strategy"], "author-role");
    assert_eq!(body["degraded"], false);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Show me a loop");
    assert_eq!(messages[1]["role"], "assistant");
    assert!(messages[1]["content"].as_str().unwrap().contains("```rust\nfor i in 0..3 {}\n```"));
}

#[tokio::test]
async fn test_empty_page_is_not_found() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/export/docx",
        Some(serde_json::json!({ "html": "<main></main>", "hostname": "gemini.google.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "No conversation found to export. Make sure you have an active Gemini conversation on the page."
    );
}

#[tokio::test]
async fn test_export_html_document() {
    let (_dir, app) = app();
    let (status, bytes) = send(
        &app,
        "POST",
        "/api/export/html",
        Some(serde_json::json!({
            "html": CHATGPT_PAGE,
            "hostname": "chatgpt.com",
            "autoPrint": true,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("<h1>ChatGPT Conversation</h1>"));
    assert!(html.contains(r#"<code class="language-rust">"#));
    assert!(html.contains("setTimeout(() => window.print(), 250)"));
}

#[tokio::test]
async fn test_export_html_uses_configured_print_delay() {
    let (_dir, app) = app_with(|config| config.print_settle_delay = Duration::from_millis(750));
    let (status, bytes) = send(
        &app,
        "POST",
        "/api/export/html",
        Some(serde_json::json!({
            "html": CHATGPT_PAGE,
            "hostname": "chatgpt.com",
            "autoPrint": true,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("setTimeout(() => window.print(), 750)"));
}

#[tokio::test]
async fn test_export_docx_download() {
    let (_dir, app) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/export/docx")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "html": CHATGPT_PAGE, "hostname": "chatgpt.com" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"ChatGPT_Export_"));
    assert!(disposition.ends_with(".docx\""));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    assert!(archive.by_name("word/document.xml").is_ok());
}

/// Prompt objects: { id, title, content, createdAt }
#[tokio::test]
async fn test_prompt_crud_shape() {
    let (_dir, app) = app();

    let (status, saved) = send_json(
        &app,
        "POST",
        "/api/prompts",
        Some(serde_json::json!({ "title": "Summarize", "content": "Summarize the above." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(saved["id"].is_string());
    assert!(saved["createdAt"].is_number());

    let id = saved["id"].as_str().unwrap().to_string();
    let (_, _) = send_json(
        &app,
        "POST",
        "/api/prompts",
        Some(serde_json::json!({ "id": id, "title": "Summary", "content": "Summarize briefly." })),
    )
    .await;

    let (_, list) = send_json(&app, "GET", "/api/prompts", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Summary");

    let (status, deleted) = send_json(&app, "DELETE", &format!("/api/prompts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (_, list) = send_json(&app, "GET", "/api/prompts", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_prompt_requires_title_and_content() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/prompts",
        Some(serde_json::json!({ "title": " ", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

/// { id, theme: { id, name, colors }, styles: [{ id, css }], html }
#[tokio::test]
async fn test_theme_selection_shape() {
    let (_dir, app) = app();

    let (_, themes) = send_json(&app, "GET", "/api/themes", None).await;
    let themes = themes.as_array().unwrap();
    assert_eq!(themes.len(), 10);
    assert!(themes[0]["colors"]["bgSecondary"].is_string());

    let (_, selected) = send_json(&app, "GET", "/api/themes/selected", None).await;
    assert_eq!(selected["id"], "default");
    assert_eq!(selected["styles"].as_array().unwrap().len(), 1);

    let other = themes
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .find(|id| *id != "default")
        .unwrap()
        .to_string();
    let (status, selected) = send_json(
        &app,
        "PUT",
        "/api/themes/selected",
        Some(serde_json::json!({ "id": other })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["theme"]["id"], other.as_str());
    let styles = selected["styles"].as_array().unwrap();
    assert_eq!(styles.len(), 2);
    assert_eq!(styles[1]["id"], "chatgpt-pro-page-theme");
    let html = selected["html"].as_str().unwrap();
    assert!(html.contains("<style id=\"chatgpt-pro-theme-overrides\">"));
}

/// INSERT_PROMPT → { success, value, field }
#[tokio::test]
async fn test_insert_prompt_message() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/messages",
        Some(serde_json::json!({
            "type": "INSERT_PROMPT",
            "content": "Explain this",
            "html": r#"<textarea id="prompt-textarea">Please: </textarea>"#,
            "hostname": "chatgpt.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["value"], "Please: Explain this");
    assert_eq!(body["field"]["kind"], "textControl");
}

#[tokio::test]
async fn test_insert_prompt_without_input_is_not_found() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/messages",
        Some(serde_json::json!({
            "type": "INSERT_PROMPT",
            "content": "x",
            "html": "<main></main>",
            "hostname": "claude.ai",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Claude input field"));
}

/// { strategy, path, isRoot, script }
#[tokio::test]
async fn test_scroll_shape() {
    let (_dir, app) = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/scroll",
        Some(serde_json::json!({
            "html": r#"<div class="overflow-y-auto"><p>messages</p></div>"#,
            "hostname": "chatgpt.com",
            "direction": "bottom",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], "largest-overflow-region");
    assert_eq!(body["isRoot"], false);
    assert!(body["script"].as_str().unwrap().contains("el.scrollHeight"));
}
