//! Workspace service: validation and defaulting in front of
//! [`arc_storage::WorkspaceRepository`].

use std::sync::Arc;

use arc_core::inputs::{self, NewWorkspace, WorkspaceUpdate};
use arc_core::{Result, Workspace, WorkspaceId, WorkspaceStats};
use arc_storage::{StorageEngine, WorkspaceRepository};

/// Validated, defaulted workspace operations.
pub struct WorkspaceService {
    repo: WorkspaceRepository,
}

impl WorkspaceService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: WorkspaceRepository::new(engine),
        }
    }

    /// Create a workspace after validating name and prefix length bounds.
    pub async fn create(&self, input: NewWorkspace) -> Result<Workspace> {
        inputs::validate_workspace_name(&input.name)?;
        inputs::validate_workspace_prefix(&input.prefix)?;
        self.repo.create(input).await
    }

    /// Fetch a workspace by id.
    pub async fn get(&self, id: &WorkspaceId) -> Result<Workspace> {
        self.repo.get(id).await
    }

    /// List every workspace.
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        self.repo.list().await
    }

    /// Apply a partial update, validating any field that changes.
    pub async fn update(&self, id: &WorkspaceId, update: WorkspaceUpdate) -> Result<Workspace> {
        if let Some(name) = &update.name {
            inputs::validate_workspace_name(name)?;
        }
        self.repo.update(id, update).await
    }

    /// Delete a workspace and everything it owns.
    pub async fn delete(&self, id: &WorkspaceId) -> Result<()> {
        self.repo.delete(id).await
    }

    /// Aggregate statistics for a workspace.
    pub async fn stats(&self, id: &WorkspaceId) -> Result<WorkspaceStats> {
        self.repo.stats(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::Error;

    #[tokio::test]
    async fn rejects_blank_name() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let service = WorkspaceService::new(engine);
        let err = service
            .create(NewWorkspace {
                name: "   ".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn rejects_oversized_prefix() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let service = WorkspaceService::new(engine);
        let err = service
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "way-too-long-a-prefix".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
