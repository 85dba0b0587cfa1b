//! Dependency repository: directed, typed edges between issues.

use std::sync::Arc;

use arc_core::inputs::{self, NewDependency};
use arc_core::{Dependency, DependencyType, Error, EventType, IssueId, IssueStatus, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::engine::StorageEngine;
use crate::error::SqliteResultExt;
use crate::repositories::events::{EventRepository, NewEvent};
use crate::rows::{parse_enum, parse_timestamp};

const COLUMNS: &str = "issue_id, depends_on_id, dep_type, created_at, created_by";

fn row_to_dependency(row: &Row<'_>) -> rusqlite::Result<Dependency> {
    Ok(Dependency {
        issue_id: IssueId::new(row.get::<_, String>(0)?),
        depends_on_id: IssueId::new(row.get::<_, String>(1)?),
        dep_type: parse_enum(2, &row.get::<_, String>(2)?)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        created_by: row.get(4)?,
    })
}

/// CRUD and graph-adjacent queries over the dependency edge relation.
pub struct DependencyRepository {
    engine: Arc<StorageEngine>,
}

impl DependencyRepository {
    /// Build a repository over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Add (or retype) a dependency edge. Rejects self-loops (D1). Upserts
    /// on `(issue_id, depends_on_id)`, updating the type on conflict (D2).
    /// A blocking-type edge (`blocks`/`parent-child`) that would close a
    /// cycle in the blocking subgraph is rejected as a `ValidationError`.
    pub async fn add(
        &self,
        issue_id: &IssueId,
        input: NewDependency,
        actor: &str,
    ) -> Result<Dependency> {
        inputs::validate_no_self_dependency(issue_id, &input.depends_on_id)?;

        let now = Utc::now();
        let dep_type = input.dep_type;
        let depends_on_id = input.depends_on_id;

        self.engine
            .transaction(|tx| {
                let target_exists: bool = tx
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM issues WHERE id = ?1)",
                        [depends_on_id.as_str()],
                        |row| row.get(0),
                    )
                    .storage_err()?;
                if !target_exists {
                    return Err(Error::not_found("issue", depends_on_id.as_str()));
                }

                if dep_type.is_blocking() && creates_cycle(tx, issue_id, &depends_on_id)? {
                    return Err(Error::validation(
                        "depends_on_id",
                        "adding this edge would create a cycle in the blocking subgraph",
                    ));
                }

                tx.execute(
                    "INSERT INTO dependencies (issue_id, depends_on_id, dep_type, created_at, created_by) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(issue_id, depends_on_id) \
                     DO UPDATE SET dep_type = excluded.dep_type, created_at = excluded.created_at, \
                     created_by = excluded.created_by",
                    params![
                        issue_id.as_str(),
                        depends_on_id.as_str(),
                        dep_type.as_str(),
                        now.to_rfc3339(),
                        actor,
                    ],
                )
                .storage_err()?;

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id,
                        event_type: EventType::DependencyAdded,
                        actor,
                        old_value: None,
                        new_value: Some(format!(
                            "{issue_id} depends on {depends_on_id} ({dep_type})"
                        )),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, %issue_id, "failed to record dependency_added event");
                }

                Ok(())
            })
            .await?;

        Ok(Dependency {
            issue_id: issue_id.clone(),
            depends_on_id,
            dep_type,
            created_at: now,
            created_by: actor.to_string(),
        })
    }

    /// Remove an edge. Records `dependency_removed`.
    pub async fn remove(&self, issue_id: &IssueId, depends_on_id: &IssueId, actor: &str) -> Result<()> {
        self.engine
            .transaction(|tx| {
                let changed = tx
                    .execute(
                        "DELETE FROM dependencies WHERE issue_id = ?1 AND depends_on_id = ?2",
                        params![issue_id.as_str(), depends_on_id.as_str()],
                    )
                    .storage_err()?;
                if changed == 0 {
                    return Err(Error::not_found(
                        "dependency",
                        format!("{issue_id}->{depends_on_id}"),
                    ));
                }

                if let Err(e) = EventRepository::record_tx(
                    tx,
                    NewEvent {
                        issue_id,
                        event_type: EventType::DependencyRemoved,
                        actor,
                        old_value: None,
                        new_value: Some(format!("{issue_id} no longer depends on {depends_on_id}")),
                        comment: None,
                    },
                ) {
                    tracing::error!(error = %e, %issue_id, "failed to record dependency_removed event");
                }
                Ok(())
            })
            .await
    }

    /// Outbound edges from `issue_id` (what it depends on).
    pub async fn list_outbound(&self, issue_id: &IssueId) -> Result<Vec<Dependency>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM dependencies WHERE issue_id = ?1"))
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], row_to_dependency)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// Inbound edges targeting `issue_id` (what depends on it).
    pub async fn list_inbound(&self, issue_id: &IssueId) -> Result<Vec<Dependency>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM dependencies WHERE depends_on_id = ?1"))
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], row_to_dependency)
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;
        Ok(rows)
    }

    /// For every outbound blocking edge (`blocks`/`parent-child`) of
    /// `issue_id`, the target id and its current status. Used by the graph
    /// resolver to compute readiness and blocked-by lists without loading
    /// the whole graph into memory.
    pub async fn blocking_targets(&self, issue_id: &IssueId) -> Result<Vec<(IssueId, IssueStatus)>> {
        let conn = self.engine.connection().await;
        let mut stmt = conn
            .prepare(
                "SELECT i.id, i.status FROM dependencies d \
                 JOIN issues i ON i.id = d.depends_on_id \
                 WHERE d.issue_id = ?1 AND d.dep_type IN ('blocks', 'parent-child')",
            )
            .storage_err()?;
        let rows = stmt
            .query_map([issue_id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .storage_err()?
            .collect::<rusqlite::Result<Vec<_>>>()
            .storage_err()?;

        rows.into_iter()
            .map(|(id, status)| {
                let status = parse_enum(1, &status).storage_err()?;
                Ok((IssueId::new(id), status))
            })
            .collect()
    }

    /// The unique outbound `parent-child` edge target for `issue_id`, if
    /// any. Issues are expected to have at most one such edge; if more than
    /// one exists (a data anomaly this schema doesn't prevent), the first
    /// by insertion order wins.
    pub async fn parent_of(&self, issue_id: &IssueId) -> Result<Option<IssueId>> {
        let conn = self.engine.connection().await;
        let parent: Option<String> = conn
            .query_row(
                "SELECT depends_on_id FROM dependencies \
                 WHERE issue_id = ?1 AND dep_type = 'parent-child' LIMIT 1",
                [issue_id.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional_storage()?;
        Ok(parent.map(IssueId::new))
    }
}

/// Extension for `.optional()` without importing `OptionalExtension` at
/// every call site in this module.
trait OptionalStorage<T> {
    fn optional_storage(self) -> Result<Option<T>>;
}

impl<T> OptionalStorage<T> for rusqlite::Result<T> {
    fn optional_storage(self) -> Result<Option<T>> {
        self.optional().storage_err()
    }
}

/// Whether adding edge `issue_id -> depends_on_id` would close a cycle in
/// the blocking subgraph, i.e. whether `depends_on_id` can already reach
/// `issue_id` by following existing `blocks`/`parent-child` edges forward.
fn creates_cycle(
    tx: &rusqlite::Transaction<'_>,
    issue_id: &IssueId,
    depends_on_id: &IssueId,
) -> Result<bool> {
    let found: Option<i64> = tx
        .query_row(
            "WITH RECURSIVE reachable(id) AS ( \
                SELECT ?1 \
                UNION \
                SELECT d.depends_on_id FROM dependencies d \
                JOIN reachable r ON d.issue_id = r.id \
                WHERE d.dep_type IN ('blocks', 'parent-child') \
             ) \
             SELECT 1 FROM reachable WHERE id = ?2 LIMIT 1",
            params![depends_on_id.as_str(), issue_id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .storage_err()?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::issues::IssueRepository;
    use crate::repositories::workspaces::WorkspaceRepository;
    use arc_core::inputs::NewIssue;

    async fn fixture() -> (Arc<StorageEngine>, IssueRepository, IssueId, IssueId) {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let ws = workspaces
            .create(arc_core::inputs::NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap();
        let issues = IssueRepository::new(engine.clone());
        let mk = |title: &str| NewIssue {
            title: title.into(),
            description: None,
            priority: None,
            issue_type: None,
            assignee: None,
            external_ref: None,
            rank: None,
        };
        let a = issues.create(&ws.id, mk("a"), "cli").await.unwrap();
        let b = issues.create(&ws.id, mk("b"), "cli").await.unwrap();
        (engine, issues, a.id, b.id)
    }

    #[tokio::test]
    async fn rejects_self_loop() {
        let (engine, _issues, a, _b) = fixture().await;
        let deps = DependencyRepository::new(engine);
        let err = deps
            .add(
                &a,
                NewDependency {
                    depends_on_id: a.clone(),
                    dep_type: DependencyType::Blocks,
                },
                "cli",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn readding_pair_updates_type_not_duplicates_row() {
        let (engine, _issues, a, b) = fixture().await;
        let deps = DependencyRepository::new(engine.clone());
        deps.add(
            &a,
            NewDependency {
                depends_on_id: b.clone(),
                dep_type: DependencyType::Related,
            },
            "cli",
        )
        .await
        .unwrap();
        deps.add(
            &a,
            NewDependency {
                depends_on_id: b.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();

        let outbound = deps.list_outbound(&a).await.unwrap();
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].dep_type, DependencyType::Blocks);
    }

    #[tokio::test]
    async fn add_then_remove_leaves_pair_empty() {
        let (engine, _issues, a, b) = fixture().await;
        let deps = DependencyRepository::new(engine.clone());
        deps.add(
            &a,
            NewDependency {
                depends_on_id: b.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();
        deps.remove(&a, &b, "cli").await.unwrap();
        assert!(deps.list_outbound(&a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blocking_edge_creating_a_cycle_is_rejected() {
        let (engine, _issues, a, b) = fixture().await;
        let deps = DependencyRepository::new(engine.clone());
        deps.add(
            &a,
            NewDependency {
                depends_on_id: b.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();

        let err = deps
            .add(
                &b,
                NewDependency {
                    depends_on_id: a.clone(),
                    dep_type: DependencyType::Blocks,
                },
                "cli",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn non_blocking_edge_never_checked_for_cycles() {
        let (engine, _issues, a, b) = fixture().await;
        let deps = DependencyRepository::new(engine.clone());
        deps.add(
            &a,
            NewDependency {
                depends_on_id: b.clone(),
                dep_type: DependencyType::Related,
            },
            "cli",
        )
        .await
        .unwrap();
        // A related edge in the other direction does not close a blocking
        // cycle since `related` never participates in readiness.
        deps.add(
            &b,
            NewDependency {
                depends_on_id: a.clone(),
                dep_type: DependencyType::Related,
            },
            "cli",
        )
        .await
        .unwrap();
    }
}
