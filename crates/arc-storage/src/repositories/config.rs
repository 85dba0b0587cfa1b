//! Config repository: workspace-scoped key/value settings.

use std::sync::Arc;

use arc_core::{ConfigEntry, Result, WorkspaceId};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::rows::parse_timestamp;

const COLUMNS: &str = "workspace_id, key, value, updated_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ConfigEntry> {
    Ok(ConfigEntry {
        workspace_id: WorkspaceId::new(row.get::<_, String>(0)?),
        key: row.get(1)?,
        value: row.get(2)?,
        updated_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

/// CRUD for a workspace's configuration key/value store.
pub struct ConfigRepository {
    engine: Arc<StorageEngine>,
}

impl ConfigRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Set a key's value, creating or overwriting it.
    pub async fn set(&self, workspace_id: &WorkspaceId, key: &str, value: String) -> Result<ConfigEntry> {
        let now = Utc::now();
        let conn = self.engine.connection().await;
        conn.execute(
            "INSERT INTO config (workspace_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (workspace_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![workspace_id.as_str(), key, value, now.to_rfc3339()],
        )
        .storage_err()?;

        Ok(ConfigEntry {
            workspace_id: workspace_id.clone(),
            key: key.to_string(),
            value,
            updated_at: now,
        })
    }

    /// Fetch a single key.
    pub async fn get(&self, workspace_id: &WorkspaceId, key: &str) -> Result<ConfigEntry> {
        let conn = self.engine.connection().await;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM config WHERE workspace_id = ?1 AND key = ?2"),
            params![workspace_id.as_str(), key],
            row_to_entry,
        )
        .optional()
        .storage_err()?
        .ok_or_else(|| arc_core::Error::not_found("config key", key))
    }

    /// List every key in a workspace, ordered by key.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<ConfigEntry>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM config WHERE workspace_id = ?1 ORDER BY key"))
            .storage_err()?;
        let rows = stmt
            .query_map([workspace_id.as_str()], row_to_entry)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Delete a key.
    pub async fn delete(&self, workspace_id: &WorkspaceId, key: &str) -> Result<()> {
        let conn = self.engine.connection().await;
        let changed = conn
            .execute(
                "DELETE FROM config WHERE workspace_id = ?1 AND key = ?2",
                params![workspace_id.as_str(), key],
            )
            .storage_err()?;
        if changed == 0 {
            return Err(arc_core::Error::not_found("config key", key));
        }
        Ok(())
    }
}
