//! `/api/v1/workspaces/{ws}/issues/{id}/comments` — CRUD.

use arc_core::inputs::{CommentUpdate, NewComment};
use arc_core::{Comment, CommentId, CommentType, IssueId};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::{Actor, AppState};

/// Query parameters accepted by `GET .../comments`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default, rename = "type")]
    comment_type: Option<CommentType>,
}

/// `GET /workspaces/{ws}/issues/{id}/comments`.
pub async fn list(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comment_type = query.comment_type.unwrap_or(CommentType::Comment);
    Ok(Json(state.comments.list(&IssueId::new(id), comment_type).await?))
}

/// `POST /workspaces/{ws}/issues/{id}/comments`.
pub async fn create(
    State(state): State<AppState>,
    Path((_ws, id)): Path<(String, String)>,
    actor: Actor,
    Json(input): Json<NewComment>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = state.comments.add(&IssueId::new(id), input, &actor.0).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /workspaces/{ws}/issues/{id}/comments/{cid}`.
pub async fn get(
    State(state): State<AppState>,
    Path((_ws, _id, cid)): Path<(String, String, i64)>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(state.comments.get(CommentId::new(cid)).await?))
}

/// `PUT /workspaces/{ws}/issues/{id}/comments/{cid}`.
pub async fn update(
    State(state): State<AppState>,
    Path((_ws, _id, cid)): Path<(String, String, i64)>,
    Json(input): Json<CommentUpdate>,
) -> ApiResult<Json<Comment>> {
    let comment = state.comments.update(CommentId::new(cid), input.text).await?;
    Ok(Json(comment))
}

/// `DELETE /workspaces/{ws}/issues/{id}/comments/{cid}`.
pub async fn delete(
    State(state): State<AppState>,
    Path((_ws, _id, cid)): Path<(String, String, i64)>,
) -> ApiResult<StatusCode> {
    state.comments.delete(CommentId::new(cid)).await?;
    Ok(StatusCode::NO_CONTENT)
}
