//! `/api/v1/workspaces/{ws}/issues` — CRUD, close/reopen, and the
//! `?details=true` aggregate view.

use arc_core::inputs::{CloseIssue, IssueFilter, IssueUpdate, NewIssue};
use arc_core::{Issue, IssueId, WorkspaceId};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::routes::plans::PlanContextResponse;
use crate::state::{Actor, AppState};

/// Query parameters accepted alongside `GET .../issues/{id}`.
#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    #[serde(default)]
    details: bool,
}

/// The full aggregate returned when `?details=true`.
#[derive(Debug, Serialize)]
pub struct IssueDetailsResponse {
    issue: Issue,
    labels: Vec<String>,
    dependencies: Vec<arc_core::Dependency>,
    dependents: Vec<arc_core::Dependency>,
    comments: Vec<arc_core::Comment>,
    plan_context: PlanContextResponse,
    blocked_by: Vec<IssueId>,
}

/// Either the bare issue or the full detail aggregate, depending on the
/// `details` query flag.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IssueResponse {
    /// `GET .../issues/{id}`.
    Bare(Issue),
    /// `GET .../issues/{id}?details=true`.
    Detailed(Box<IssueDetailsResponse>),
}

/// `GET /workspaces/{ws}/issues`.
pub async fn list(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Query(filter): Query<IssueFilter>,
) -> ApiResult<Json<Vec<Issue>>> {
    let issues = state.issues.list(&WorkspaceId::new(ws), &filter).await?;
    Ok(Json(issues))
}

/// `POST /workspaces/{ws}/issues`.
pub async fn create(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    actor: Actor,
    Json(input): Json<NewIssue>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    let issue = state.issues.create(&WorkspaceId::new(ws), input, &actor.0).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// `GET /workspaces/{ws}/issues/{id}`.
pub async fn get(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    Query(query): Query<DetailsQuery>,
) -> ApiResult<Json<IssueResponse>> {
    let issue_id = IssueId::new(id);
    if query.details {
        let details = state.issues.get_details(&issue_id).await?;
        Ok(Json(IssueResponse::Detailed(Box::new(IssueDetailsResponse {
            issue: details.issue,
            labels: details.labels,
            dependencies: details.dependencies,
            dependents: details.dependents,
            comments: details.comments,
            plan_context: details.plan_context.into(),
            blocked_by: details.blocked_by,
        }))))
    } else {
        Ok(Json(IssueResponse::Bare(state.issues.get(&issue_id).await?)))
    }
}

/// `PUT /workspaces/{ws}/issues/{id}`.
pub async fn update(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<IssueUpdate>,
) -> ApiResult<Json<Issue>> {
    let issue = state.issues.update(&IssueId::new(id), input, &actor.0).await?;
    Ok(Json(issue))
}

/// `DELETE /workspaces/{ws}/issues/{id}`.
pub async fn delete(State(state): State<AppState>, Path((_ws, id)): Path<(String, String)>) -> ApiResult<StatusCode> {
    state.issues.delete(&IssueId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /workspaces/{ws}/issues/{id}/close`.
pub async fn close(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<CloseIssue>,
) -> ApiResult<Json<Issue>> {
    let issue = state.issues.close(&IssueId::new(id), input.reason, &actor.0).await?;
    Ok(Json(issue))
}

/// `POST /workspaces/{ws}/issues/{id}/reopen` — the symmetric counterpart
/// to `close`, reverting a closed issue back to open.
pub async fn reopen(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
) -> ApiResult<Json<Issue>> {
    let issue = state.issues.reopen(&IssueId::new(id), &actor.0).await?;
    Ok(Json(issue))
}

/// `GET /workspaces/{ws}/issues/{id}/is-blocked` — exposes the resolver's
/// single-issue blocked check alongside the ready/blocked-work listings.
#[derive(Debug, Serialize)]
pub struct IsBlockedResponse {
    blocked: bool,
    blocked_by: Vec<IssueId>,
}

/// Handler for the above.
pub async fn is_blocked(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
) -> ApiResult<Json<IsBlockedResponse>> {
    let (blocked, blocked_by) = state.issues.is_blocked(&IssueId::new(id)).await?;
    Ok(Json(IsBlockedResponse { blocked, blocked_by }))
}
