//! End-to-end HTTP tests driving the real router over an in-memory
//! database, exercising the request/response cycle the way a client would.

use std::sync::Arc;

use arc_server::{AppState, ServerConfig};
use arc_storage::StorageEngine;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let state = AppState::new(engine, ServerConfig::default());
    arc_server::routes::router(state)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

#[tokio::test]
async fn health_check_bypasses_services() {
    let router = router();
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn workspace_and_issue_lifecycle_over_http() {
    let router = router();

    let (status, ws) = send(
        &router,
        "POST",
        "/workspaces",
        Some(json!({"name": "acme", "prefix": "arc"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ws_id = ws["id"].as_str().unwrap().to_string();

    let (status, issue) = send(
        &router,
        "POST",
        &format!("/workspaces/{ws_id}/issues"),
        Some(json!({"title": "fix the thing"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issue["status"], "open");
    let issue_id = issue["id"].as_str().unwrap().to_string();

    let (status, fetched) =
        send(&router, "GET", &format!("/workspaces/{ws_id}/issues/{issue_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "fix the thing");

    let (status, _) = send(
        &router,
        "POST",
        &format!("/workspaces/{ws_id}/issues/{issue_id}/close"),
        Some(json!({"reason": "done"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, events) =
        send(&router, "GET", &format!("/workspaces/{ws_id}/issues/{issue_id}/events"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["event_type"], "closed");
}

#[tokio::test]
async fn not_found_surfaces_as_404() {
    let router = router();
    let (status, body) = send(&router, "GET", "/workspaces/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn blank_workspace_name_is_a_400() {
    let router = router();
    let (status, _) =
        send(&router, "POST", "/workspaces", Some(json!({"name": "", "prefix": "arc"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn epic_gates_children_over_http() {
    let router = router();
    let (_, ws) = send(&router, "POST", "/workspaces", Some(json!({"name": "acme", "prefix": "arc"}))).await;
    let ws_id = ws["id"].as_str().unwrap().to_string();

    let (_, epic) = send(
        &router,
        "POST",
        &format!("/workspaces/{ws_id}/issues"),
        Some(json!({"title": "epic", "issue_type": "epic"})),
    )
    .await;
    let epic_id = epic["id"].as_str().unwrap().to_string();

    let (_, child) = send(
        &router,
        "POST",
        &format!("/workspaces/{ws_id}/issues"),
        Some(json!({"title": "child task"})),
    )
    .await;
    let child_id = child["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        "POST",
        &format!("/workspaces/{ws_id}/issues/{child_id}/deps"),
        Some(json!({"depends_on_id": epic_id, "dep_type": "parent-child"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, ready) = send(&router, "GET", &format!("/workspaces/{ws_id}/ready"), None).await;
    assert_eq!(status, StatusCode::OK);
    let ready_ids: Vec<&str> = ready.as_array().unwrap().iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert!(ready_ids.contains(&epic_id.as_str()));
    assert!(!ready_ids.contains(&child_id.as_str()));
}
