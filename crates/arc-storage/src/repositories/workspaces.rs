//! Workspace repository: the top-level tenancy boundary.

use std::sync::Arc;

use arc_core::inputs::{NewWorkspace, WorkspaceUpdate};
use arc_core::{Error, Result, Workspace, WorkspaceId, WorkspaceStats};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::rows::parse_timestamp;

const COLUMNS: &str = "id, name, path, description, prefix, created_at, updated_at";

fn row_to_workspace(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: WorkspaceId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        path: row.get(2)?,
        description: row.get(3)?,
        prefix: row.get(4)?,
        created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        updated_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

/// Typed CRUD plus statistics for workspaces.
pub struct WorkspaceRepository {
    engine: Arc<StorageEngine>,
}

impl WorkspaceRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Create a workspace. The caller has already validated name/prefix
    /// length bounds; this only enforces the unique-name constraint via the
    /// underlying index (surfaced as [`Error::Conflict`]).
    pub async fn create(&self, input: NewWorkspace) -> Result<Workspace> {
        let id = WorkspaceId::new(uuid_like_id());
        let now = Utc::now();
        let conn = self.engine.connection().await;
        conn.execute(
            &format!("INSERT INTO workspaces ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                id.as_str(),
                input.name,
                input.path,
                input.description,
                input.prefix,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .storage_err_as("workspace")?;

        Ok(Workspace {
            id,
            name: input.name.clone(),
            path: input.path,
            description: input.description,
            prefix: input.prefix,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a workspace by id.
    pub async fn get(&self, id: &WorkspaceId) -> Result<Workspace> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM workspaces WHERE id = ?1"),
            [id.as_str()],
            row_to_workspace,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| Error::not_found("workspace", id.as_str()))
    }

    /// List every workspace, ordered by name.
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM workspaces ORDER BY name"))
            .storage_err()?;
        let rows = stmt
            .query_map([], row_to_workspace)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Apply a partial update. Only fields present in `update` change;
    /// `updated_at` always advances.
    pub async fn update(
        &self,
        id: &WorkspaceId,
        update: WorkspaceUpdate,
    ) -> Result<Workspace> {
        let mut existing = self.get(id).await?;
        if let Some(name) = update.name {
            existing.name = name;
        }
        if let Some(path) = update.path {
            existing.path = Some(path);
        }
        if let Some(description) = update.description {
            existing.description = Some(description);
        }
        existing.updated_at = Utc::now();

        let conn = self.engine.connection().await;
        conn.execute(
            "UPDATE workspaces SET name = ?1, path = ?2, description = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                existing.name,
                existing.path,
                existing.description,
                existing.updated_at.to_rfc3339(),
                id.as_str(),
            ],
        )
        .storage_err_as("workspace")?;
        Ok(existing)
    }

    /// Delete a workspace and everything it owns. Cascades are enforced by
    /// `ON DELETE CASCADE` foreign keys; this only issues the root delete.
    pub async fn delete(&self, id: &WorkspaceId) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute("DELETE FROM workspaces WHERE id = ?1", [id.as_str()])
            .storage_err()?;
        if changed == 0 {
            return Err(Error::not_found("workspace", id.as_str()));
        }
        Ok(())
    }

    /// Aggregate issue counts by status and mean lead time in hours over
    /// closed issues.
    pub async fn stats(&self, id: &WorkspaceId) -> Result<WorkspaceStats> {
        // Confirm the workspace exists so a stats call on an unknown id 404s
        // rather than returning an all-zero report.
        self.get(id).await?;

        let conn = self.engine.connection().await;
        let mut counts = WorkspaceStats {
            workspace_id: id.clone(),
            total_issues: 0,
            open: 0,
            in_progress: 0,
            blocked: 0,
            deferred: 0,
            closed: 0,
            avg_lead_time_hours: None,
        };

        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM issues WHERE workspace_id = ?1 GROUP BY status")
            .storage_err()?;
        let rows = stmt
            .query_map([id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;

        for (status, count) in rows {
            counts.total_issues += count;
            match status.as_str() {
                "open" => counts.open = count,
                "in_progress" => counts.in_progress = count,
                "blocked" => counts.blocked = count,
                "deferred" => counts.deferred = count,
                "closed" => counts.closed = count,
                _ => {}
            }
        }

        let mut lead_stmt = conn
            .prepare(
                "SELECT created_at, closed_at FROM issues \
                 WHERE workspace_id = ?1 AND status = 'closed' AND closed_at IS NOT NULL",
            )
            .storage_err()?;
        let spans = lead_stmt
            .query_map([id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;

        if !spans.is_empty() {
            let mut total_hours = 0.0;
            let mut n = 0u32;
            for (created_raw, closed_raw) in spans {
                let created = parse_timestamp(0, &created_raw).storage_err()?;
                let closed = parse_timestamp(1, &closed_raw).storage_err()?;
                total_hours += (closed - created).num_seconds() as f64 / 3600.0;
                n += 1;
            }
            counts.avg_lead_time_hours = Some(total_hours / f64::from(n));
        }

        Ok(counts)
    }
}

/// A process-local unique id suffix for workspaces: workspace ids are not
/// part of the issue-id display scheme, so a random-looking opaque string is
/// sufficient (invariant: unique, not derived from any user-visible prefix).
fn uuid_like_id() -> String {
    use sha2::{Digest, Sha256};
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(nanos.to_be_bytes());
    hasher.update(std::process::id().to_be_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, 16)
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes.iter().take(len / 2).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::issues::IssueRepository;
    use arc_core::inputs::NewIssue;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let repo = WorkspaceRepository::new(engine);
        let ws = repo
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: Some("/repos/acme".into()),
                description: None,
            })
            .await
            .unwrap();

        let fetched = repo.get(&ws.id).await.unwrap();
        assert_eq!(fetched.name, "acme");
        assert_eq!(fetched.prefix, "arc");
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let repo = WorkspaceRepository::new(engine);
        let new = |name: &str| NewWorkspace {
            name: name.into(),
            prefix: "arc".into(),
            path: None,
            description: None,
        };
        repo.create(new("acme")).await.unwrap();
        let err = repo.create(new("acme")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_cascades_to_issues() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());

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

        workspaces.delete(&ws.id).await.unwrap();
        let err = issues.get(&issue.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    /// 3 issues, 2 labels, 1 shared plan, 5 events — all gone after the
    /// workspace itself is deleted.
    #[tokio::test]
    async fn delete_cascades_to_labels_plans_and_events() {
        use crate::repositories::events::EventRepository;
        use crate::repositories::labels::LabelRepository;
        use crate::repositories::plans::PlanRepository;
        use arc_core::inputs::{NewLabel, PlanInput};

        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());
        let labels = LabelRepository::new(engine.clone());
        let plans = PlanRepository::new(engine.clone());
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

        let new_issue = |title: &str| NewIssue {
            title: title.into(),
            description: None,
            priority: None,
            issue_type: None,
            assignee: None,
            external_ref: None,
            rank: None,
        };
        let i1 = issues.create(&ws.id, new_issue("one"), "cli").await.unwrap();
        let i2 = issues.create(&ws.id, new_issue("two"), "cli").await.unwrap();
        let i3 = issues.create(&ws.id, new_issue("three"), "cli").await.unwrap();

        labels
            .create(&ws.id, NewLabel { name: "bug".into(), color: None, description: None })
            .await
            .unwrap();
        labels
            .create(&ws.id, NewLabel { name: "urgent".into(), color: None, description: None })
            .await
            .unwrap();
        labels.attach(&ws.id, &i1.id, "bug", "cli").await.unwrap();

        let plan = plans
            .create(&ws.id, PlanInput { title: "Launch".into(), content: "steps".into() })
            .await
            .unwrap();
        plans.link(&i1.id, plan.id).await.unwrap();

        // 3 `created` events from the issue creates above, 1 `label_added`
        // from the attach above, and 1 more `commented` recorded here: 5
        // events total across the workspace's issues.
        events
            .record(crate::repositories::events::NewEvent {
                issue_id: &i2.id,
                event_type: arc_core::EventType::Commented,
                actor: "cli",
                old_value: None,
                new_value: Some("note".into()),
                comment: None,
            })
            .await
            .unwrap();

        workspaces.delete(&ws.id).await.unwrap();

        for id in [&i1.id, &i2.id, &i3.id] {
            assert!(matches!(issues.get(id).await.unwrap_err(), Error::NotFound { .. }));
        }
        assert!(labels.list(&ws.id).await.unwrap().is_empty());
        assert!(plans.list(&ws.id).await.unwrap().is_empty());
        assert!(events.list_for_issue(&i1.id, None).await.unwrap().is_empty());
        assert!(events.list_for_issue(&i2.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_counts_by_status_and_lead_time() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());
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
        issues.close(&issue.id, None, "cli").await.unwrap();

        let stats = workspaces.stats(&ws.id).await.unwrap();
        assert_eq!(stats.total_issues, 1);
        assert_eq!(stats.closed, 1);
        assert!(stats.avg_lead_time_hours.is_some());
    }
}
