//! Dependency service: validation in front of
//! [`arc_storage::DependencyRepository`].

use std::sync::Arc;

use arc_core::inputs::NewDependency;
use arc_core::{Dependency, IssueId, Result};
use arc_storage::{DependencyRepository, StorageEngine};

/// Validated dependency-edge operations.
pub struct DependencyService {
    repo: DependencyRepository,
}

impl DependencyService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: DependencyRepository::new(engine),
        }
    }

    /// Add (or retype) a dependency edge. Self-loop and cycle validation
    /// happen in the repository, which is the only component with enough
    /// information to check the latter without a second round trip.
    pub async fn add(&self, issue_id: &IssueId, input: NewDependency, actor: &str) -> Result<Dependency> {
        self.repo.add(issue_id, input, actor).await
    }

    /// Remove an edge.
    pub async fn remove(&self, issue_id: &IssueId, depends_on_id: &IssueId, actor: &str) -> Result<()> {
        self.repo.remove(issue_id, depends_on_id, actor).await
    }

    /// An issue's outbound and inbound edges, for `GET .../deps`.
    pub async fn graph_for_issue(&self, issue_id: &IssueId) -> Result<(Vec<Dependency>, Vec<Dependency>)> {
        let outbound = self.repo.list_outbound(issue_id).await?;
        let inbound = self.repo.list_inbound(issue_id).await?;
        Ok((outbound, inbound))
    }
}
