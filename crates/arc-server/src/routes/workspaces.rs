//! `/api/v1/workspaces` — CRUD and statistics.

use arc_core::inputs::{NewWorkspace, WorkspaceUpdate};
use arc_core::{Workspace, WorkspaceId, WorkspaceStats};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /workspaces`.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Workspace>>> {
    Ok(Json(state.workspaces.list().await?))
}

/// `POST /workspaces`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewWorkspace>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let workspace = state.workspaces.create(input).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

/// `GET /workspaces/{ws}`.
pub async fn get(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<Json<Workspace>> {
    Ok(Json(state.workspaces.get(&WorkspaceId::new(ws)).await?))
}

/// `PUT /workspaces/{ws}`.
pub async fn update(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<WorkspaceUpdate>,
) -> ApiResult<Json<Workspace>> {
    Ok(Json(state.workspaces.update(&WorkspaceId::new(ws), input).await?))
}

/// `DELETE /workspaces/{ws}`.
pub async fn delete(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<StatusCode> {
    state.workspaces.delete(&WorkspaceId::new(ws)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /workspaces/{ws}/stats`.
pub async fn stats(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<Json<WorkspaceStats>> {
    Ok(Json(state.workspaces.stats(&WorkspaceId::new(ws)).await?))
}
