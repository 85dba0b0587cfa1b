//! `/api/v1/workspaces/{ws}/plans` — shared plan CRUD and link/unlink, plus
//! `/api/v1/workspaces/{ws}/issues/{id}/plan{,/history}` for the inline plan
//! surface.

use arc_core::inputs::{PlanInput, SetInlinePlan};
use arc_core::{Comment, IssueId, Plan, PlanId, WorkspaceId};
use arc_graph::PlanContext;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::{Actor, AppState};

/// The wire shape of [`arc_graph::PlanContext`]; defined here rather than on
/// the domain type since it's a presentation concern (`has_plan` is
/// computed, not stored).
#[derive(Debug, Serialize)]
pub struct PlanContextResponse {
    pub inline_plan: Option<Comment>,
    pub parent_issue_id: Option<IssueId>,
    pub parent_plan: Option<Comment>,
    pub shared_plans: Vec<Plan>,
    pub has_plan: bool,
}

impl From<PlanContext> for PlanContextResponse {
    fn from(context: PlanContext) -> Self {
        Self {
            has_plan: context.has_plan(),
            inline_plan: context.inline_plan,
            parent_issue_id: context.parent_issue_id,
            parent_plan: context.parent_plan,
            shared_plans: context.shared_plans,
        }
    }
}

/// `GET /workspaces/{ws}/plans`.
pub async fn list(State(state): State<AppState>, Path(ws): Path<String>) -> ApiResult<Json<Vec<Plan>>> {
    Ok(Json(state.plans.list(&WorkspaceId::new(ws)).await?))
}

/// `POST /workspaces/{ws}/plans`.
pub async fn create(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Json(input): Json<PlanInput>,
) -> ApiResult<(StatusCode, Json<Plan>)> {
    let plan = state.plans.create(&WorkspaceId::new(ws), input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /workspaces/{ws}/plans/{id}`.
pub async fn get(State(state): State<AppState>, Path((_ws, id)): Path<(String, i64)>) -> ApiResult<Json<Plan>> {
    Ok(Json(state.plans.get(PlanId::new(id)).await?))
}

/// `PUT /workspaces/{ws}/plans/{id}`.
pub async fn update(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, i64)>,
    Json(input): Json<PlanInput>,
) -> ApiResult<Json<Plan>> {
    Ok(Json(state.plans.update(PlanId::new(id), input).await?))
}

/// `DELETE /workspaces/{ws}/plans/{id}`.
pub async fn delete(State(state): State<AppState>, Path((_ws, id)): Path<(String, i64)>) -> ApiResult<StatusCode> {
    state.plans.delete(PlanId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /workspaces/{ws}/plans/{id}/link/{issue}`.
pub async fn link(
    State(state): State<AppState>,
    Path((_ws, id, issue)): Path<(String, i64, String)>,
) -> ApiResult<StatusCode> {
    state.plans.link(&IssueId::new(issue), PlanId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /workspaces/{ws}/plans/{id}/link/{issue}`.
pub async fn unlink(
    State(state): State<AppState>,
    Path((_ws, id, issue)): Path<(String, i64, String)>,
) -> ApiResult<StatusCode> {
    state.plans.unlink(&IssueId::new(issue), PlanId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /workspaces/{ws}/issues/{id}/plan` — the resolved plan context.
pub async fn context(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
) -> ApiResult<Json<PlanContextResponse>> {
    let context = state.plans.context_for(&IssueId::new(id)).await?;
    Ok(Json(context.into()))
}

/// `POST /workspaces/{ws}/issues/{id}/plan` — append a new inline plan
/// version.
pub async fn set_inline(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<SetInlinePlan>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.plans.set_inline_plan(&IssueId::new(id), input.text, &actor.0).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /workspaces/{ws}/issues/{id}/plan/history`.
pub async fn history(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.plans.history_for(&IssueId::new(id)).await?))
}
