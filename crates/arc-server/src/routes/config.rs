//! `/api/v1/workspaces/{ws}/config` — workspace-scoped key/value settings.

use arc_core::inputs::SetConfigEntry;
use arc_core::{ConfigEntry, WorkspaceId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /workspaces/{ws}/config`.
pub async fn list(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<Json<Vec<ConfigEntry>>> {
    Ok(Json(state.workspace_config.list(&WorkspaceId::new(ws)).await?))
}

/// `GET /workspaces/{ws}/config/{key}`.
pub async fn get(
    State(state): State<AppState>,
    Path((ws, key)): Path<(String, String)>,
) -> ApiResult<Json<ConfigEntry>> {
    Ok(Json(state.workspace_config.get(&WorkspaceId::new(ws), &key).await?))
}

/// `PUT /workspaces/{ws}/config/{key}` — create or overwrite.
pub async fn set(
    State(state): State<AppState>,
    Path((ws, key)): Path<(String, String)>,
    Json(input): Json<SetConfigEntry>,
) -> ApiResult<Json<ConfigEntry>> {
    let entry = state
        .workspace_config
        .set(&WorkspaceId::new(ws), &key, input.value)
        .await?;
    Ok(Json(entry))
}

/// `DELETE /workspaces/{ws}/config/{key}`.
pub async fn delete(
    State(state): State<AppState>,
    Path((ws, key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.workspace_config.delete(&WorkspaceId::new(ws), &key).await?;
    Ok(StatusCode::NO_CONTENT)
}
