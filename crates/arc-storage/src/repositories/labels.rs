//! Label repository: the per-workspace tagging vocabulary and its
//! many-to-many association with issues.

use std::sync::Arc;

use arc_core::inputs::NewLabel;
use arc_core::{EventType, IssueId, Label, Result, WorkspaceId};
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::repositories::events::{EventRepository, NewEvent};

const COLUMNS: &str = "workspace_id, name, color, description";

fn row_to_label(row: &Row<'_>) -> rusqlite::Result<Label> {
    Ok(Label {
        workspace_id: WorkspaceId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        color: row.get(2)?,
        description: row.get(3)?,
    })
}

/// CRUD for the label vocabulary, plus attach/detach against issues.
pub struct LabelRepository {
    engine: Arc<StorageEngine>,
}

impl LabelRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Create a label in a workspace. Re-creating an existing
    /// `(workspace_id, name)` pair surfaces as [`arc_core::Error::Conflict`]
    /// via the composite primary key.
    pub async fn create(&self, workspace_id: &WorkspaceId, input: NewLabel) -> Result<Label> {
        let conn = self.engine.connection().await;
        conn.execute(
            &format!("INSERT INTO labels ({COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
            params![workspace_id.as_str(), input.name, input.color, input.description],
        )
        .storage_err_as("label")?;

        Ok(Label {
            workspace_id: workspace_id.clone(),
            name: input.name,
            color: input.color,
            description: input.description,
        })
    }

    /// Fetch a label by its composite key.
    pub async fn get(&self, workspace_id: &WorkspaceId, name: &str) -> Result<Label> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM labels WHERE workspace_id = ?1 AND name = ?2"),
            params![workspace_id.as_str(), name],
            row_to_label,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| arc_core::Error::not_found("label", name))
    }

    /// List every label in a workspace, ordered by name.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Label>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM labels WHERE workspace_id = ?1 ORDER BY name"
            ))
            .storage_err()?;
        let rows = stmt
            .query_map([workspace_id.as_str()], row_to_label)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Update a label's color/description. The name is the key and is not
    /// itself mutable through this path.
    pub async fn update(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
        color: Option<String>,
        description: Option<String>,
    ) -> Result<Label> {
        let mut label = self.get(workspace_id, name).await?;
        if color.is_some() {
            label.color = color;
        }
        if description.is_some() {
            label.description = description;
        }

        let conn = self.engine.connection().await;
        conn.execute(
            "UPDATE labels SET color = ?1, description = ?2 WHERE workspace_id = ?3 AND name = ?4",
            params![label.color, label.description, workspace_id.as_str(), name],
        )
        .storage_err()?;
        Ok(label)
    }

    /// Delete a label. Cascades to `issue_labels` via foreign key.
    pub async fn delete(&self, workspace_id: &WorkspaceId, name: &str) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute(
                "DELETE FROM labels WHERE workspace_id = ?1 AND name = ?2",
                params![workspace_id.as_str(), name],
            )
            .storage_err()?;
        if changed == 0 {
            return Err(arc_core::Error::not_found("label", name));
        }
        Ok(())
    }

    /// Attach a label to an issue, recording a `label_added` event.
    pub async fn attach(
        &self,
        workspace_id: &WorkspaceId,
        issue_id: &IssueId,
        label_name: &str,
        actor: &str,
    ) -> Result<()> {
        self.engine
            .transaction(|tx| {
                tx.execute(
                    "INSERT OR IGNORE INTO issue_labels (issue_id, workspace_id, label_name) \
                     VALUES (?1, ?2, ?3)",
                    params![issue_id.as_str(), workspace_id.as_str(), label_name],
                )
                .storage_err()?;

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id,
                        event_type: EventType::LabelAdded,
                        actor,
                        old_value: None,
                        new_value: Some(label_name.to_string()),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, %issue_id, "failed to record label_added event");
                }
                Ok(())
            })
            .await
    }

    /// Detach a label from an issue, recording a `label_removed` event.
    pub async fn detach(&self, issue_id: &IssueId, label_name: &str, actor: &str) -> Result<()> {
        self.engine
            .transaction(|tx| {
                let changed = tx
                    .execute(
                        "DELETE FROM issue_labels WHERE issue_id = ?1 AND label_name = ?2",
                        params![issue_id.as_str(), label_name],
                    )
                    .storage_err()?;
                if changed == 0 {
                    return Err(arc_core::Error::not_found("label association", label_name));
                }

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id,
                        event_type: EventType::LabelRemoved,
                        actor,
                        old_value: None,
                        new_value: Some(label_name.to_string()),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, %issue_id, "failed to record label_removed event");
                }
                Ok(())
            })
            .await
    }

    /// The names of every label attached to an issue.
    pub async fn list_for_issue(&self, issue_id: &IssueId) -> Result<Vec<String>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare("SELECT label_name FROM issue_labels WHERE issue_id = ?1 ORDER BY label_name")
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], |row| row.get::<_, String>(0))
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::issues::IssueRepository;
    use crate::repositories::workspaces::WorkspaceRepository;
    use arc_core::inputs::{NewIssue, NewWorkspace};

    async fn fixture() -> (Arc<StorageEngine>, WorkspaceId, IssueId) {
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
        (engine, ws.id, issue.id)
    }

    #[tokio::test]
    async fn attach_then_detach_round_trips() {
        let (engine, ws_id, issue_id) = fixture().await;
        let labels = LabelRepository::new(engine);
        labels
            .create(
                &ws_id,
                NewLabel {
                    name: "urgent".into(),
                    color: None,
                    description: None,
                },
            )
            .await
            .unwrap();

        labels.attach(&ws_id, &issue_id, "urgent", "cli").await.unwrap();
        assert_eq!(labels.list_for_issue(&issue_id).await.unwrap(), vec!["urgent"]);

        labels.detach(&issue_id, "urgent", "cli").await.unwrap();
        assert!(labels.list_for_issue(&issue_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_label_cascades_to_association() {
        let (engine, ws_id, issue_id) = fixture().await;
        let labels = LabelRepository::new(engine);
        labels
            .create(
                &ws_id,
                NewLabel {
                    name: "urgent".into(),
                    color: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        labels.attach(&ws_id, &issue_id, "urgent", "cli").await.unwrap();

        labels.delete(&ws_id, "urgent").await.unwrap();
        assert!(labels.list_for_issue(&issue_id).await.unwrap().is_empty());
    }
}
