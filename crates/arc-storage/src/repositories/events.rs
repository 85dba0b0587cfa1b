//! Audit recorder: an append-only, write-mostly event log keyed by issue.
//!
//! Invoked by the other repositories after a successful mutation, inside
//! the same transaction as the mutation itself, and never read from outside
//! [`EventRepository::list_for_issue`]. A failure recording an event is
//! logged and swallowed by the *caller* (see each repository's mutation
//! methods) rather than here, since this type has no way to tell a
//! best-effort call from one the caller actually wants to fail on.

use std::sync::Arc;

use arc_core::{Error, Event, EventId, EventType, IssueId, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::rows::{parse_enum, parse_timestamp};

const COLUMNS: &str = "id, issue_id, event_type, actor, old_value, new_value, comment, created_at";

/// The default page size for `list_for_issue` when the caller specifies
/// none, per spec.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: EventId::new(row.get(0)?),
        issue_id: IssueId::new(row.get::<_, String>(1)?),
        event_type: parse_enum(2, &row.get::<_, String>(2)?)?,
        actor: row.get(3)?,
        old_value: row.get(4)?,
        new_value: row.get(5)?,
        comment: row.get(6)?,
        created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}

/// Fields needed to record one audit entry.
pub struct NewEvent<'a> {
    /// The issue this event describes.
    pub issue_id: &'a IssueId,
    /// The kind of mutation.
    pub event_type: EventType,
    /// Who performed it (`X-Actor`, default `cli`).
    pub actor: &'a str,
    /// The value before the mutation, if meaningful.
    pub old_value: Option<String>,
    /// The value after the mutation, if meaningful.
    pub new_value: Option<String>,
    /// An optional free-form note.
    pub comment: Option<String>,
}

/// Audit trail storage, and the audit recorder itself.
pub struct EventRepository {
    engine: Arc<StorageEngine>,
}

impl EventRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Record one event, using the engine's own connection (not inside an
    /// existing transaction). Prefer [`EventRepository::record_tx`] from
    /// within a repository mutation so the event lands in the same
    /// transaction as the row change it describes.
    pub async fn record(&self, event: NewEvent<'_>) -> Result<Event> {
        let conn = self.engine.connection().await;
        Self::insert(&conn, event)
    }

    /// Record one event using an open transaction, so it commits or rolls
    /// back atomically with the mutation that produced it.
    pub fn record_tx(tx: &rusqlite::Transaction<'_>, event: NewEvent<'_>) -> Result<Event> {
        Self::insert(tx, event)
    }

    fn insert(conn: &Connection, event: NewEvent<'_>) -> Result<Event> {
        let now = Utc::now();
        conn.execute(
            "INSERT INTO events (issue_id, event_type, actor, old_value, new_value, comment, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.issue_id.as_str(),
                event.event_type.as_str(),
                event.actor,
                event.old_value,
                event.new_value,
                event.comment,
                now.to_rfc3339(),
            ],
        )
        .storage_err()?;
        let id = EventId::new(conn.last_insert_rowid());
        Ok(Event {
            id,
            issue_id: event.issue_id.clone(),
            event_type: event.event_type,
            actor: event.actor.to_string(),
            old_value: event.old_value,
            new_value: event.new_value,
            comment: event.comment,
            created_at: now,
        })
    }

    /// List events for an issue, newest first, capped at `limit` (defaults
    /// to [`DEFAULT_LIST_LIMIT`] when `None`).
    pub async fn list_for_issue(&self, issue_id: &IssueId, limit: Option<i64>) -> Result<Vec<Event>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM events WHERE issue_id = ?1 ORDER BY id DESC LIMIT ?2"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map(params![issue_id.as_str(), limit], row_to_event)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Fetch a single event by id, used by tests asserting audit
    /// monotonicity.
    #[cfg(test)]
    pub async fn get(&self, id: EventId) -> Result<Event> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM events WHERE id = ?1"),
            [id.value()],
            row_to_event,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| Error::not_found("event", id.value().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::comments::CommentRepository;
    use crate::repositories::issues::IssueRepository;
    use crate::repositories::workspaces::WorkspaceRepository;
    use arc_core::inputs::{IssueUpdate, NewIssue, NewWorkspace};
    use arc_core::{CommentType, IssueStatus};

    /// Create, status-change, comment, and close an issue, then read its
    /// event list back newest-first with the expected `new_value` on each
    /// entry.
    #[tokio::test]
    async fn audit_trail_lists_newest_first_with_expected_values() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());
        let comments = CommentRepository::new(engine.clone());
        let events = EventRepository::new(engine.clone());

        let ws = workspaces
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap();
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

        issues
            .update(
                &issue.id,
                IssueUpdate {
                    status: Some(IssueStatus::InProgress),
                    ..IssueUpdate::default()
                },
                "cli",
            )
            .await
            .unwrap();
        comments.add(&issue.id, "hello".into(), CommentType::Comment, "cli").await.unwrap();
        issues.close(&issue.id, Some("done".into()), "cli").await.unwrap();

        let history = events.list_for_issue(&issue.id, None).await.unwrap();
        let kinds: Vec<_> = history.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(kinds, vec!["closed", "commented", "status_changed", "created"]);
        assert_eq!(history[0].new_value.as_deref(), Some("done"));
        assert_eq!(history[1].new_value.as_deref(), Some("hello"));
        assert_eq!(history[2].new_value.as_deref(), Some("in_progress"));
        assert_eq!(history[3].new_value.as_deref(), Some("t"));
    }
}
