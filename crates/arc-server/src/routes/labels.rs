//! `/api/v1/workspaces/{ws}/labels` — CRUD plus attach/detach to an issue.

use arc_core::inputs::NewLabel;
use arc_core::{IssueId, Label, WorkspaceId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::{Actor, AppState};

/// `GET /workspaces/{ws}/labels`.
pub async fn list(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(state.labels.list(&WorkspaceId::new(ws)).await?))
}

/// `POST /workspaces/{ws}/labels`.
pub async fn create(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<NewLabel>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    let label = state.labels.create(&WorkspaceId::new(ws), input).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// `GET /workspaces/{ws}/labels/{name}`.
pub async fn get(
    State(state): State<AppState>,
    Path((ws, name)): Path<(String, String)>,
) -> ApiResult<Json<Label>> {
    Ok(Json(state.labels.get(&WorkspaceId::new(ws), &name).await?))
}

/// Body of `PUT /workspaces/{ws}/labels/{name}`.
#[derive(Debug, Deserialize)]
pub struct LabelUpdate {
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// `PUT /workspaces/{ws}/labels/{name}`.
pub async fn update(
    State(state): State<AppState>,
    Path((ws, name)): Path<(String, String)>,
    Json(input): Json<LabelUpdate>,
) -> ApiResult<Json<Label>> {
    let label = state
        .labels
        .update(&WorkspaceId::new(ws), &name, input.color, input.description)
        .await?;
    Ok(Json(label))
}

/// `DELETE /workspaces/{ws}/labels/{name}`.
pub async fn delete(State(state): State<AppState>, Path((ws, name)): Path<(String, String)>) -> ApiResult<StatusCode> {
    state.labels.delete(&WorkspaceId::new(ws), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body of `POST /workspaces/{ws}/issues/{id}/labels`.
#[derive(Debug, Deserialize)]
pub struct AttachLabel {
    name: String,
}

/// `POST /workspaces/{ws}/issues/{id}/labels`.
pub async fn attach(
    State(state): State<AppState>,
    Path((ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<AttachLabel>,
) -> ApiResult<StatusCode> {
    state
        .labels
        .attach(&WorkspaceId::new(ws), &IssueId::new(id), &input.name, &actor.0)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /workspaces/{ws}/issues/{id}/labels/{name}`.
pub async fn detach(
    State(state): State<AppState>,
    Path((_ws, id, name)): Path<(String, String, String)>,
    actor: Actor,
) -> ApiResult<StatusCode> {
    state.labels.detach(&IssueId::new(id), &name, &actor.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
