//! Config service: validation in front of
//! [`arc_storage::ConfigRepository`].

use std::sync::Arc;

use arc_core::inputs::validate_config_key;
use arc_core::{ConfigEntry, Result, WorkspaceId};
use arc_storage::{ConfigRepository, StorageEngine};

/// Validated key/value config CRUD, scoped to a workspace.
pub struct ConfigService {
    repo: ConfigRepository,
}

impl ConfigService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: ConfigRepository::new(engine),
        }
    }

    /// Set a key's value, creating or overwriting it.
    pub async fn set(&self, workspace_id: &WorkspaceId, key: &str, value: String) -> Result<ConfigEntry> {
        validate_config_key(key)?;
        self.repo.set(workspace_id, key, value).await
    }

    /// Fetch a single key.
    pub async fn get(&self, workspace_id: &WorkspaceId, key: &str) -> Result<ConfigEntry> {
        self.repo.get(workspace_id, key).await
    }

    /// List every key in a workspace.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<ConfigEntry>> {
        self.repo.list(workspace_id).await
    }

    /// Delete a key.
    pub async fn delete(&self, workspace_id: &WorkspaceId, key: &str) -> Result<()> {
        self.repo.delete(workspace_id, key).await
    }
}
