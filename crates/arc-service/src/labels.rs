//! Label service: validation in front of
//! [`arc_storage::LabelRepository`].

use std::sync::Arc;

use arc_core::inputs::NewLabel;
use arc_core::{IssueId, Label, Result, WorkspaceId};
use arc_storage::{LabelRepository, StorageEngine};

/// Validated label CRUD and attach/detach.
pub struct LabelService {
    repo: LabelRepository,
}

impl LabelService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: LabelRepository::new(engine),
        }
    }

    /// Create a label, rejecting an empty name.
    pub async fn create(&self, workspace_id: &WorkspaceId, input: NewLabel) -> Result<Label> {
        if input.name.trim().is_empty() {
            return Err(arc_core::Error::validation("name", "label name must not be empty"));
        }
        self.repo.create(workspace_id, input).await
    }

    /// Fetch a label.
    pub async fn get(&self, workspace_id: &WorkspaceId, name: &str) -> Result<Label> {
        self.repo.get(workspace_id, name).await
    }

    /// List every label in a workspace.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Label>> {
        self.repo.list(workspace_id).await
    }

    /// Update a label's color/description.
    pub async fn update(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
        color: Option<String>,
        description: Option<String>,
    ) -> Result<Label> {
        self.repo.update(workspace_id, name, color, description).await
    }

    /// Delete a label.
    pub async fn delete(&self, workspace_id: &WorkspaceId, name: &str) -> Result<()> {
        self.repo.delete(workspace_id, name).await
    }

    /// Attach a label to an issue.
    pub async fn attach(
        &self,
        workspace_id: &WorkspaceId,
        issue_id: &IssueId,
        label_name: &str,
        actor: &str,
    ) -> Result<()> {
        self.repo.attach(workspace_id, issue_id, label_name, actor).await
    }

    /// Detach a label from an issue.
    pub async fn detach(&self, issue_id: &IssueId, label_name: &str, actor: &str) -> Result<()> {
        self.repo.detach(issue_id, label_name, actor).await
    }
}
