//! `/api/v1/workspaces/{ws}/issues/{id}/deps` — add, remove, and list.

use arc_core::inputs::NewDependency;
use arc_core::{Dependency, IssueId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::{Actor, AppState};

/// `POST /workspaces/{ws}/issues/{id}/deps`.
pub async fn add(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<NewDependency>,
) -> ApiResult<(StatusCode, Json<Dependency>)> {
    let dep = state.dependencies.add(&IssueId::new(id), input, &actor.0).await?;
    Ok((StatusCode::CREATED, Json(dep)))
}

/// `DELETE /workspaces/{ws}/issues/{id}/deps/{target}`.
pub async fn remove(
    State(state): State<AppState>,
    Path((_ws, id, target)): Path<(String, String, String)>,
    actor: Actor,
) -> ApiResult<StatusCode> {
    state
        .dependencies
        .remove(&IssueId::new(id), &IssueId::new(target), &actor.0)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The body of `GET /workspaces/{ws}/issues/{id}/deps`.
#[derive(Debug, Serialize)]
pub struct DependencyGraph {
    dependencies: Vec<Dependency>,
    dependents: Vec<Dependency>,
}

/// `GET /workspaces/{ws}/issues/{id}/deps`.
pub async fn graph(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
) -> ApiResult<Json<DependencyGraph>> {
    let (dependencies, dependents) = state.dependencies.graph_for_issue(&IssueId::new(id)).await?;
    Ok(Json(DependencyGraph { dependencies, dependents }))
}
