//! Issue service: validation, defaulting, the `?details=true` aggregate
//! view, and the `is_blocked` pre-check before surfacing "ready" hints.

use std::sync::Arc;

use arc_core::inputs::{self, IssueFilter, IssueUpdate, NewIssue};
use arc_core::{Comment, Dependency, Issue, IssueId, Result, WorkspaceId};
use arc_graph::{GraphResolver, PlanContext, PlanContextAggregator};
use arc_storage::{CommentRepository, DependencyRepository, IssueRepository, LabelRepository, StorageEngine};

/// The full aggregate returned by `GET .../issues/{id}?details=true`.
#[derive(Debug, Clone)]
pub struct IssueDetails {
    /// The issue itself.
    pub issue: Issue,
    /// Labels attached to the issue.
    pub labels: Vec<String>,
    /// Outbound dependency edges (what this issue depends on).
    pub dependencies: Vec<Dependency>,
    /// Inbound dependency edges (what depends on this issue).
    pub dependents: Vec<Dependency>,
    /// All comments on the issue, oldest first.
    pub comments: Vec<Comment>,
    /// The resolved plan context.
    pub plan_context: PlanContext,
    /// Whether the issue is currently blocked, and by what.
    pub blocked_by: Vec<IssueId>,
}

/// Validated, defaulted issue operations plus the detail aggregate.
pub struct IssueService {
    issues: IssueRepository,
    dependencies: DependencyRepository,
    labels: LabelRepository,
    comments: CommentRepository,
    resolver: GraphResolver,
    plan_context: PlanContextAggregator,
}

impl IssueService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            issues: IssueRepository::new(engine.clone()),
            dependencies: DependencyRepository::new(engine.clone()),
            labels: LabelRepository::new(engine.clone()),
            comments: CommentRepository::new(engine.clone()),
            resolver: GraphResolver::new(engine.clone()),
            plan_context: PlanContextAggregator::new(engine),
        }
    }

    /// Create an issue. Title and priority bounds are enforced by
    /// [`arc_storage::IssueRepository::create`] already; this is the place
    /// later cross-entity validation (e.g. rejecting an unknown label at
    /// creation time) would be added.
    pub async fn create(&self, workspace_id: &WorkspaceId, input: NewIssue, actor: &str) -> Result<Issue> {
        self.issues.create(workspace_id, input, actor).await
    }

    /// Fetch a bare issue.
    pub async fn get(&self, id: &IssueId) -> Result<Issue> {
        self.issues.get(id).await
    }

    /// Fetch the full detail aggregate: labels, dependencies, dependents,
    /// comments, plan context, and blocked-by state.
    pub async fn get_details(&self, id: &IssueId) -> Result<IssueDetails> {
        let issue = self.issues.get(id).await?;
        let labels = self.labels.list_for_issue(id).await?;
        let dependencies = self.dependencies.list_outbound(id).await?;
        let dependents = self.dependencies.list_inbound(id).await?;
        let comments = self.comments.list_all_for_issue(id).await?;
        let plan_context = self.plan_context.context_for(id).await?;
        let (_, blocked_by) = self.resolver.is_blocked(id).await?;

        Ok(IssueDetails {
            issue,
            labels,
            dependencies,
            dependents,
            comments,
            plan_context,
            blocked_by,
        })
    }

    /// List issues in a workspace with filters and pagination.
    pub async fn list(&self, workspace_id: &WorkspaceId, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.issues.list(workspace_id, filter).await
    }

    /// Apply a partial update, rejecting an empty map and out-of-range
    /// values before touching storage.
    pub async fn update(&self, id: &IssueId, update: IssueUpdate, actor: &str) -> Result<Issue> {
        if update.is_empty() {
            return Err(arc_core::Error::validation("update", "update must change at least one field"));
        }
        if let Some(priority) = update.priority {
            inputs::validate_priority(priority)?;
        }
        self.issues.update(id, update, actor).await
    }

    /// Close an issue.
    pub async fn close(&self, id: &IssueId, reason: Option<String>, actor: &str) -> Result<Issue> {
        self.issues.close(id, reason, actor).await
    }

    /// Reopen an issue.
    pub async fn reopen(&self, id: &IssueId, actor: &str) -> Result<Issue> {
        self.issues.reopen(id, actor).await
    }

    /// Delete an issue and everything it owns.
    pub async fn delete(&self, id: &IssueId) -> Result<()> {
        self.issues.delete(id).await
    }

    /// Whether `id` is currently blocked, and by what — used to annotate
    /// issue responses with a "ready" hint without a separate round trip.
    pub async fn is_blocked(&self, id: &IssueId) -> Result<(bool, Vec<IssueId>)> {
        self.resolver.is_blocked(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::inputs::NewWorkspace;
    use arc_storage::WorkspaceRepository;

    async fn fixture() -> (Arc<StorageEngine>, WorkspaceId) {
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
        (engine, ws.id)
    }

    #[tokio::test]
    async fn update_rejects_empty_map_before_touching_storage() {
        let (engine, ws_id) = fixture().await;
        let service = IssueService::new(engine);
        let issue = service
            .create(
                &ws_id,
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

        let err = service.update(&issue.id, IssueUpdate::default(), "cli").await.unwrap_err();
        assert!(matches!(err, arc_core::Error::Validation { .. }));
    }

    #[tokio::test]
    async fn details_aggregate_includes_plan_context_and_labels() {
        let (engine, ws_id) = fixture().await;
        let service = IssueService::new(engine.clone());
        let labels = LabelRepository::new(engine.clone());
        let issue = service
            .create(
                &ws_id,
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
        labels
            .create(
                &ws_id,
                arc_core::inputs::NewLabel {
                    name: "urgent".into(),
                    color: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        labels.attach(&ws_id, &issue.id, "urgent", "cli").await.unwrap();

        let details = service.get_details(&issue.id).await.unwrap();
        assert_eq!(details.labels, vec!["urgent"]);
        assert!(!details.plan_context.has_plan());
        assert!(details.blocked_by.is_empty());
    }
}
