//! Comment repository: free-form notes and plan versions attached to an
//! issue.
//!
//! `comment`-typed rows list oldest first; `plan`-typed rows list newest
//! first so the latest plan version is always first — the ordering is
//! applied at the query layer via the `comment_type` parameter rather than
//! sorted in Rust afterwards.

use std::sync::Arc;

use arc_core::{Comment, CommentId, CommentType, Error, EventType, IssueId, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::repositories::events::{EventRepository, NewEvent};
use crate::rows::{parse_enum, parse_timestamp};

const COLUMNS: &str = "id, issue_id, author, text, comment_type, created_at, updated_at";

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId::new(row.get(0)?),
        issue_id: IssueId::new(row.get::<_, String>(1)?),
        author: row.get(2)?,
        text: row.get(3)?,
        comment_type: parse_enum(4, &row.get::<_, String>(4)?)?,
        created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        updated_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

/// CRUD for comments and plan-typed comment versions.
pub struct CommentRepository {
    engine: Arc<StorageEngine>,
}

impl CommentRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Add a comment, assigning its id and recording a `commented` event
    /// with the text as new-value.
    pub async fn add(
        &self,
        issue_id: &IssueId,
        text: String,
        comment_type: CommentType,
        actor: &str,
    ) -> Result<Comment> {
        let now = Utc::now();
        let id = self
            .engine
            .transaction(|tx| {
                tx.execute(
                    "INSERT INTO comments (issue_id, author, text, comment_type, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        issue_id.as_str(),
                        actor,
                        text,
                        comment_type.as_str(),
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )
                .storage_err()?;
                let id = CommentId::new(tx.last_insert_rowid());

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id,
                        event_type: EventType::Commented,
                        actor,
                        old_value: None,
                        new_value: Some(text.clone()),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, %issue_id, "failed to record commented event");
                }

                Ok(id)
            })
            .await?;

        Ok(Comment {
            id,
            issue_id: issue_id.clone(),
            author: actor.to_string(),
            text,
            comment_type,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a comment by id.
    pub async fn get(&self, id: CommentId) -> Result<Comment> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM comments WHERE id = ?1"),
            [id.value()],
            row_to_comment,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| Error::not_found("comment", id.value().to_string()))
    }

    /// List comments of a given type attached to an issue, in the type's
    /// canonical order: ascending for `comment`, descending for `plan`.
    pub async fn list_for_issue(
        &self,
        issue_id: &IssueId,
        comment_type: CommentType,
    ) -> Result<Vec<Comment>> {
        let direction = match comment_type {
            CommentType::Comment => "ASC",
            CommentType::Plan => "DESC",
        };
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM comments WHERE issue_id = ?1 AND comment_type = ?2 \
                 ORDER BY created_at {direction}, id {direction}"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map(params![issue_id.as_str(), comment_type.as_str()], row_to_comment)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// All comments (both types) on an issue, in creation order, for the
    /// `?details=true` issue aggregate.
    pub async fn list_all_for_issue(&self, issue_id: &IssueId) -> Result<Vec<Comment>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM comments WHERE issue_id = ?1 ORDER BY created_at ASC, id ASC"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], row_to_comment)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// The most recent `plan`-typed comment on an issue, if any — an
    /// issue's "inline plan".
    pub async fn latest_plan(&self, issue_id: &IssueId) -> Result<Option<Comment>> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!(
                "SELECT {COLUMNS} FROM comments WHERE issue_id = ?1 AND comment_type = 'plan' \
                 ORDER BY created_at DESC, id DESC LIMIT 1"
            ),
            [issue_id.as_str()],
            row_to_comment,
        )
        .optional()
        .storage_err()
    }

    /// Edit a comment's text, bumping `updated_at`. Does not emit a new
    /// audit event; only creation does.
    pub async fn update(&self, id: CommentId, text: String) -> Result<Comment> {
        let mut comment = self.get(id).await?;
        comment.text = text;
        comment.updated_at = Utc::now();

        let conn = self.engine.connection().await;
        conn.execute(
            "UPDATE comments SET text = ?1, updated_at = ?2 WHERE id = ?3",
            params![comment.text, comment.updated_at.to_rfc3339(), id.value()],
        )
        .storage_err()?;
        Ok(comment)
    }

    /// Delete a comment.
    pub async fn delete(&self, id: CommentId) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute("DELETE FROM comments WHERE id = ?1", [id.value()])
            .storage_err()?;
        if changed == 0 {
            return Err(Error::not_found("comment", id.value().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::issues::IssueRepository;
    use crate::repositories::workspaces::WorkspaceRepository;
    use arc_core::inputs::{NewIssue, NewWorkspace};

    async fn fixture() -> (Arc<StorageEngine>, IssueId) {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let ws = workspaces
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap();
        let issues = IssueRepository::new(engine.clone());
        let issue = issues
            .create(
                &ws.id,
                NewIssue {
                    title: "t".into(),
                    description: None,
                    priority: None,
                    issue_type: None,
                    assignee: None,
                    external_ref: None,
                    rank: None,
                },
                "cli",
            )
            .await
            .unwrap();
        (engine, issue.id)
    }

    #[tokio::test]
    async fn plan_comments_list_newest_first() {
        let (engine, issue_id) = fixture().await;
        let comments = CommentRepository::new(engine);
        comments
            .add(&issue_id, "phase 1".into(), CommentType::Plan, "cli")
            .await
            .unwrap();
        comments
            .add(&issue_id, "phase 2".into(), CommentType::Plan, "cli")
            .await
            .unwrap();

        let history = comments.list_for_issue(&issue_id, CommentType::Plan).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "phase 2");
        assert_eq!(history[1].text, "phase 1");

        let latest = comments.latest_plan(&issue_id).await.unwrap().unwrap();
        assert_eq!(latest.text, "phase 2");
    }

    #[tokio::test]
    async fn plain_comments_list_oldest_first() {
        let (engine, issue_id) = fixture().await;
        let comments = CommentRepository::new(engine);
        comments
            .add(&issue_id, "first".into(), CommentType::Comment, "cli")
            .await
            .unwrap();
        comments
            .add(&issue_id, "second".into(), CommentType::Comment, "cli")
            .await
            .unwrap();

        let listed = comments.list_for_issue(&issue_id, CommentType::Comment).await.unwrap();
        assert_eq!(listed[0].text, "first");
        assert_eq!(listed[1].text, "second");
    }
}
