//! Issue repository: create/get/list/update/close/reopen/delete, plus id
//! generation and the audit events each mutation produces.

use std::sync::Arc;

use arc_core::id_generation::generate_issue_id;
use arc_core::inputs::{self, IssueFilter, IssueUpdate, NewIssue};
use arc_core::{Error, Issue, IssueId, IssueStatus, IssueType, Result, WorkspaceId};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::repositories::events::{EventRepository, NewEvent};
use crate::rows::{parse_enum, parse_timestamp, parse_timestamp_opt};

const COLUMNS: &str = "id, workspace_id, title, description, status, priority, rank, issue_type, \
                        assignee, external_ref, created_at, updated_at, closed_at, close_reason";

/// How many times id generation retries on a primary-key collision, with a
/// fresh timestamp seed each attempt, before giving up.
const MAX_ID_COLLISION_RETRIES: u32 = 5;

fn row_to_issue(row: &Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: IssueId::new(row.get::<_, String>(0)?),
        workspace_id: WorkspaceId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_enum(4, &row.get::<_, String>(4)?)?,
        priority: row.get(5)?,
        rank: row.get(6)?,
        issue_type: parse_enum(7, &row.get::<_, String>(7)?)?,
        assignee: row.get(8)?,
        external_ref: row.get(9)?,
        created_at: parse_timestamp(10, &row.get::<_, String>(10)?)?,
        updated_at: parse_timestamp(11, &row.get::<_, String>(11)?)?,
        closed_at: parse_timestamp_opt(12, row.get(12)?)?,
        close_reason: row.get(13)?,
    })
}

/// Typed CRUD plus lifecycle transitions for issues.
pub struct IssueRepository {
    engine: Arc<StorageEngine>,
}

impl IssueRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Create an issue, assigning its id from the owning workspace's
    /// prefix, applying field defaults, and recording a `created` event.
    pub async fn create(
        &self,
        workspace_id: &WorkspaceId,
        input: NewIssue,
        actor: &str,
    ) -> Result<Issue> {
        inputs::validate_issue_title(&input.title)?;
        let priority = input.priority.unwrap_or(inputs::DEFAULT_PRIORITY);
        inputs::validate_priority(priority)?;
        let issue_type = input.issue_type.unwrap_or(IssueType::Task);
        let rank = input.rank.unwrap_or(0);

        let prefix = {
            let conn = self.engine.connection().await;
            conn.query_row(
                "SELECT prefix FROM workspaces WHERE id = ?1",
                [workspace_id.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .storage_err()?
            .ok_or_else(|| Error::not_found("workspace", workspace_id.as_str()))?
        };

        let now = Utc::now();
        let timestamp_nanos = i128::from(now.timestamp_nanos_opt().unwrap_or_default());

        for nonce in 0..MAX_ID_COLLISION_RETRIES {
            let id = IssueId::new(generate_issue_id(&prefix, &input.title, timestamp_nanos, nonce));
            let attempt = self
                .engine
                .transaction(|tx| {
                    tx.execute(
                        &format!(
                            "INSERT INTO issues ({COLUMNS}) VALUES \
                             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                        ),
                        params![
                            id.as_str(),
                            workspace_id.as_str(),
                            input.title,
                            input.description,
                            IssueStatus::Open.as_str(),
                            priority,
                            rank,
                            issue_type.as_str(),
                            input.assignee,
                            input.external_ref,
                            now.to_rfc3339(),
                            now.to_rfc3339(),
                            Option::<String>::None,
                            Option::<String>::None,
                        ],
                    )
                    .storage_err()?;

                    if let Err(e) = EventRepository::record_tx(
                        tx,
                        NewEvent {
                            issue_id: &id,
                            event_type: arc_core::EventType::Created,
                            actor,
                            old_value: None,
                            new_value: Some(input.title.clone()),
                            comment: None,
                        },
                    ) {
                        tracing::error!(error = %e, issue_id = %id, "failed to record created event");
                    }

                    Ok(id.clone())
                })
                .await;

            match attempt {
                Ok(id) => {
                    return Ok(Issue {
                        id,
                        workspace_id: workspace_id.clone(),
                        title: input.title,
                        description: input.description,
                        status: IssueStatus::Open,
                        priority,
                        rank,
                        issue_type,
                        assignee: input.assignee,
                        external_ref: input.external_ref,
                        created_at: now,
                        updated_at: now,
                        closed_at: None,
                        close_reason: None,
                    });
                }
                Err(Error::Conflict(_)) => continue,
                Err(other) => return Err(other),
            }
        }

        Err(Error::Conflict(format!(
            "could not allocate a unique issue id after {MAX_ID_COLLISION_RETRIES} attempts"
        )))
    }

    /// Fetch an issue by id.
    pub async fn get(&self, id: &IssueId) -> Result<Issue> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM issues WHERE id = ?1"),
            [id.as_str()],
            row_to_issue,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| Error::not_found("issue", id.as_str()))
    }

    /// List issues in a workspace, applying the filter's predicates and
    /// pagination at the query layer.
    pub async fn list(&self, workspace_id: &WorkspaceId, filter: &IssueFilter) -> Result<Vec<Issue>> {
        use rusqlite::types::Value;

        let mut sql = format!("SELECT {COLUMNS} FROM issues WHERE workspace_id = ?1");
        let mut args: Vec<Value> = vec![Value::Text(workspace_id.as_str().to_string())];

        if let Some(status) = filter.status {
            args.push(Value::Text(status.as_str().to_string()));
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(issue_type) = filter.issue_type {
            args.push(Value::Text(issue_type.as_str().to_string()));
            sql.push_str(&format!(" AND issue_type = ?{}", args.len()));
        }
        if let Some(assignee) = &filter.assignee {
            args.push(Value::Text(assignee.clone()));
            sql.push_str(&format!(" AND assignee = ?{}", args.len()));
        }
        if let Some(q) = &filter.q {
            let pattern = format!("%{q}%");
            args.push(Value::Text(pattern.clone()));
            let title_param = args.len();
            args.push(Value::Text(pattern));
            let description_param = args.len();
            sql.push_str(&format!(
                " AND (title LIKE ?{title_param} OR description LIKE ?{description_param})"
            ));
        }
        sql.push_str(" ORDER BY created_at ASC");
        if filter.limit.is_some() || filter.offset.is_some() {
            // SQLite requires OFFSET to follow a LIMIT clause; -1 means "no cap".
            args.push(Value::Integer(filter.limit.unwrap_or(-1)));
            sql.push_str(&format!(" LIMIT ?{}", args.len()));
            args.push(Value::Integer(filter.offset.unwrap_or(0)));
            sql.push_str(&format!(" OFFSET ?{}", args.len()));
        }

        let conn = self.engine.connection().await;
        let mut stmt = conn.prepare(&sql).storage_err()?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args), row_to_issue)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// List every open-like issue in a workspace, for the graph resolver.
    /// Bypasses the filter machinery above since the resolver applies its
    /// own secondary filters in memory.
    pub async fn list_open_like(&self, workspace_id: &WorkspaceId) -> Result<Vec<Issue>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM issues WHERE workspace_id = ?1 AND status IN ('open', 'in_progress')"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map([workspace_id.as_str()], row_to_issue)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Every non-closed issue in a workspace, for blocked-work resolution.
    pub async fn list_non_closed(&self, workspace_id: &WorkspaceId) -> Result<Vec<Issue>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM issues WHERE workspace_id = ?1 AND status != 'closed'"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map([workspace_id.as_str()], row_to_issue)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Apply a recognized-field update. Forces `closed_at` when the status
    /// transitions to `closed`, clears it for any other target status, and
    /// emits `status_changed` or `updated` accordingly.
    pub async fn update(&self, id: &IssueId, update: IssueUpdate, actor: &str) -> Result<Issue> {
        if update.is_empty() {
            return Err(Error::validation("update", "update must change at least one field"));
        }
        if let Some(priority) = update.priority {
            inputs::validate_priority(priority)?;
        }
        if let Some(title) = &update.title {
            inputs::validate_issue_title(title)?;
        }

        let mut issue = self.get(id).await?;
        let old_status = issue.status;

        if let Some(title) = update.title {
            issue.title = title;
        }
        if let Some(description) = update.description {
            issue.description = Some(description);
        }
        if let Some(priority) = update.priority {
            issue.priority = priority;
        }
        if let Some(issue_type) = update.issue_type {
            issue.issue_type = issue_type;
        }
        if let Some(assignee) = update.assignee {
            issue.assignee = Some(assignee);
        }
        if let Some(external_ref) = update.external_ref {
            issue.external_ref = Some(external_ref);
        }
        if let Some(rank) = update.rank {
            issue.rank = rank;
        }
        if let Some(status) = update.status {
            issue.status = status;
            issue.closed_at = if status == IssueStatus::Closed {
                Some(issue.closed_at.unwrap_or_else(Utc::now))
            } else {
                None
            };
        }
        issue.updated_at = Utc::now();

        let event_type = if issue.status == old_status {
            arc_core::EventType::Updated
        } else {
            arc_core::EventType::StatusChanged
        };
        let new_value = if matches!(event_type, arc_core::EventType::StatusChanged) {
            Some(issue.status.as_str().to_string())
        } else {
            Some(issue.title.clone())
        };
        let old_value = if matches!(event_type, arc_core::EventType::StatusChanged) {
            Some(old_status.as_str().to_string())
        } else {
            None
        };

        self.engine
            .transaction(|tx| {
                tx.execute(
                    "UPDATE issues SET title = ?1, description = ?2, status = ?3, priority = ?4, \
                     rank = ?5, issue_type = ?6, assignee = ?7, external_ref = ?8, updated_at = ?9, \
                     closed_at = ?10, close_reason = ?11 WHERE id = ?12",
                    params![
                        issue.title,
                        issue.description,
                        issue.status.as_str(),
                        issue.priority,
                        issue.rank,
                        issue.issue_type.as_str(),
                        issue.assignee,
                        issue.external_ref,
                        issue.updated_at.to_rfc3339(),
                        issue.closed_at.map(|t| t.to_rfc3339()),
                        issue.close_reason,
                        id.as_str(),
                    ],
                )
                .storage_err()?;

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id: id,
                        event_type,
                        actor,
                        old_value,
                        new_value,
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, issue_id = %id, "failed to record update event");
                }
                Ok(())
            })
            .await?;

        Ok(issue)
    }

    /// Close an issue: sets status, stamps `closed_at`, stores the reason
    /// (may be empty), records a `closed` event with the reason as
    /// new-value.
    pub async fn close(&self, id: &IssueId, reason: Option<String>, actor: &str) -> Result<Issue> {
        let mut issue = self.get(id).await?;
        issue.status = IssueStatus::Closed;
        issue.closed_at = Some(Utc::now());
        issue.close_reason = reason.clone();
        issue.updated_at = Utc::now();

        self.engine
            .transaction(|tx| {
                tx.execute(
                    "UPDATE issues SET status = ?1, closed_at = ?2, close_reason = ?3, updated_at = ?4 \
                     WHERE id = ?5",
                    params![
                        IssueStatus::Closed.as_str(),
                        issue.closed_at.map(|t| t.to_rfc3339()),
                        issue.close_reason,
                        issue.updated_at.to_rfc3339(),
                        id.as_str(),
                    ],
                )
                .storage_err()?;

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id: id,
                        event_type: arc_core::EventType::Closed,
                        actor,
                        old_value: None,
                        new_value: reason.clone(),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, issue_id = %id, "failed to record closed event");
                }
                Ok(())
            })
            .await?;

        Ok(issue)
    }

    /// Reopen an issue: sets status to `open`, clears `closed_at` and
    /// `close_reason`, records `reopened`.
    pub async fn reopen(&self, id: &IssueId, actor: &str) -> Result<Issue> {
        let mut issue = self.get(id).await?;
        issue.status = IssueStatus::Open;
        issue.closed_at = None;
        issue.close_reason = None;
        issue.updated_at = Utc::now();

        self.engine
            .transaction(|tx| {
                tx.execute(
                    "UPDATE issues SET status = ?1, closed_at = NULL, close_reason = NULL, updated_at = ?2 \
                     WHERE id = ?3",
                    params![IssueStatus::Open.as_str(), issue.updated_at.to_rfc3339(), id.as_str()],
                )
                .storage_err()?;

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id: id,
                        event_type: arc_core::EventType::Reopened,
                        actor,
                        old_value: None,
                        new_value: None,
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, issue_id = %id, "failed to record reopened event");
                }
                Ok(())
            })
            .await?;

        Ok(issue)
    }

    /// Delete an issue. Cascades (dependencies both directions, label
    /// associations, plan links, comments, events) are enforced by foreign
    /// keys; this issues only the root delete.
    pub async fn delete(&self, id: &IssueId) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute("DELETE FROM issues WHERE id = ?1", [id.as_str()])
            .storage_err()?;
        if changed == 0 {
            return Err(Error::not_found("issue", id.as_str()));
        }
        Ok(())
    }
}
