//! `GET /api/v1/workspaces/{ws}/issues/{id}/events` — the audit trail,
//! newest first.

use arc_core::{Event, IssueId};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters accepted by `GET .../events`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    limit: Option<i64>,
}

/// `GET /workspaces/{ws}/issues/{id}/events`.
pub async fn list(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = state.events.list_for_issue(&IssueId::new(id), query.limit).await?;
    Ok(Json(events))
}
