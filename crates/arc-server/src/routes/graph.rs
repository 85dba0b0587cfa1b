//! `/api/v1/workspaces/{ws}/ready` and `/blocked` — the graph resolver
//! endpoints.

use arc_core::inputs::ReadyWorkQuery;
use arc_core::{Issue, IssueId, WorkspaceId};
use arc_graph::ReadyWorkOptions;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /workspaces/{ws}/ready`.
pub async fn ready(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Query(query): Query<ReadyWorkQuery>,
) -> ApiResult<Json<Vec<Issue>>> {
    let options = ReadyWorkOptions {
        sort: query.sort.unwrap_or(state.config.default_sort),
        limit: query.limit,
        filter: arc_core::inputs::ReadyWorkFilter {
            issue_type: query.issue_type,
            priority: query.priority,
            assignee: query.assignee,
            unassigned_only: query.unassigned_only.unwrap_or(false),
            status: None,
        },
    };
    let resolver = arc_graph::GraphResolver::new(state.engine.clone());
    let issues = resolver.ready_work(&WorkspaceId::new(ws), &options).await?;
    Ok(Json(issues))
}

/// Query parameters accepted by `GET .../blocked`.
#[derive(Debug, Deserialize)]
pub struct BlockedQuery {
    #[serde(default)]
    limit: Option<i64>,
}

/// The wire shape of a blocked-visible issue, flattened for JSON.
#[derive(Debug, Serialize)]
pub struct BlockedIssueResponse {
    #[serde(flatten)]
    issue: Issue,
    blocked_by_count: usize,
    blocked_by: Vec<IssueId>,
}

/// `GET /workspaces/{ws}/blocked`.
pub async fn blocked(
    State(state): State<AppState>,
    Path(ws): Path<String>,
    Query(query): Query<BlockedQuery>,
) -> ApiResult<Json<Vec<BlockedIssueResponse>>> {
    let resolver = arc_graph::GraphResolver::new(state.engine.clone());
    let blocked = resolver.blocked_work(&WorkspaceId::new(ws), query.limit).await?;
    Ok(Json(
        blocked
            .into_iter()
            .map(|b| BlockedIssueResponse {
                issue: b.issue,
                blocked_by_count: b.blocked_by_count,
                blocked_by: b.blocked_by,
            })
            .collect(),
    ))
}
