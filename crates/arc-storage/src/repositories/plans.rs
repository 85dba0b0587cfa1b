//! Shared plan repository: first-class `Plan` documents, linked
//! many-to-many with issues via `issue_plans`.

use std::sync::Arc;

use arc_core::inputs::PlanInput;
use arc_core::{Error, IssueId, Plan, PlanId, Result, WorkspaceId};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;

const COLUMNS: &str = "id, workspace_id, title, content, created_at, updated_at";

fn row_to_plan(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: PlanId::new(row.get(0)?),
        workspace_id: WorkspaceId::new(row.get::<_, String>(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: crate::rows::parse_timestamp(4, &row.get::<_, String>(4)?)?,
        updated_at: crate::rows::parse_timestamp(5, &row.get::<_, String>(5)?)?,
    })
}

/// CRUD for shared plans, plus link/unlink against issues.
pub struct PlanRepository {
    engine: Arc<StorageEngine>,
}

impl PlanRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Create a shared plan document.
    pub async fn create(&self, workspace_id: &WorkspaceId, input: PlanInput) -> Result<Plan> {
        let now = Utc::now();
        let conn = self.engine.connection().await;
        conn.execute(
            "INSERT INTO plans (workspace_id, title, content, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![workspace_id.as_str(), input.title, input.content, now.to_rfc3339(), now.to_rfc3339()],
        )
        .storage_err()?;
        let id = PlanId::new(conn.last_insert_rowid());

        Ok(Plan {
            id,
            workspace_id: workspace_id.clone(),
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a plan by id.
    pub async fn get(&self, id: PlanId) -> Result<Plan> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM plans WHERE id = ?1"),
            [id.value()],
            row_to_plan,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| Error::not_found("plan", id.value().to_string()))
    }

    /// List every shared plan in a workspace, newest-updated first.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Plan>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM plans WHERE workspace_id = ?1 ORDER BY updated_at DESC"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map([workspace_id.as_str()], row_to_plan)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Update a plan's title/content.
    pub async fn update(&self, id: PlanId, input: PlanInput) -> Result<Plan> {
        let mut plan = self.get(id).await?;
        plan.title = input.title;
        plan.content = input.content;
        plan.updated_at = Utc::now();

        let conn = self.engine.connection().await;
        conn.execute(
            "UPDATE plans SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![plan.title, plan.content, plan.updated_at.to_rfc3339(), id.value()],
        )
        .storage_err()?;
        Ok(plan)
    }

    /// Delete a plan. Cascades to `issue_plans` via foreign key.
    pub async fn delete(&self, id: PlanId) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute("DELETE FROM plans WHERE id = ?1", [id.value()])
            .storage_err()?;
        if changed == 0 {
            return Err(Error::not_found("plan", id.value().to_string()));
        }
        Ok(())
    }

    /// Link a plan to an issue (many-to-many; re-linking is a no-op).
    pub async fn link(&self, issue_id: &IssueId, plan_id: PlanId) -> Result<()> {
        let conn = self.engine.connection().await;
        conn.execute(
            "INSERT OR IGNORE INTO issue_plans (issue_id, plan_id) VALUES (?1, ?2)",
            params![issue_id.as_str(), plan_id.value()],
        )
        .storage_err()?;
        Ok(())
    }

    /// Unlink a plan from an issue.
    pub async fn unlink(&self, issue_id: &IssueId, plan_id: PlanId) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute(
                "DELETE FROM issue_plans WHERE issue_id = ?1 AND plan_id = ?2",
                params![issue_id.as_str(), plan_id.value()],
            )
            .storage_err()?;
        if changed == 0 {
            return Err(Error::not_found("plan link", plan_id.value().to_string()));
        }
        Ok(())
    }

    /// Every shared plan linked to an issue, newest-updated first — the
    /// "shared plans" source for the plan context aggregator.
    pub async fn list_for_issue(&self, issue_id: &IssueId) -> Result<Vec<Plan>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(
                "SELECT p.id, p.workspace_id, p.title, p.content, p.created_at, p.updated_at \
                 FROM plans p JOIN issue_plans ip ON ip.plan_id = p.id \
                 WHERE ip.issue_id = ?1 ORDER BY p.updated_at DESC",
            )
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], row_to_plan)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }
}
