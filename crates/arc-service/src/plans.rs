//! Plan service: validation in front of [`arc_storage::PlanRepository`] for
//! shared plan documents, plus the inline-plan surface backed by
//! [`arc_graph::PlanContextAggregator`].

use std::sync::Arc;

use arc_core::inputs::{self, PlanInput};
use arc_core::{Comment, IssueId, Plan, PlanId, Result, WorkspaceId};
use arc_graph::{PlanContext, PlanContextAggregator};
use arc_storage::{PlanRepository, StorageEngine};

/// Validated shared-plan CRUD, link/unlink, and inline-plan operations.
pub struct PlanService {
    repo: PlanRepository,
    plan_context: PlanContextAggregator,
}

impl PlanService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: PlanRepository::new(engine.clone()),
            plan_context: PlanContextAggregator::new(engine),
        }
    }

    /// Create a shared plan document, rejecting an empty or oversized title.
    pub async fn create(&self, workspace_id: &WorkspaceId, input: PlanInput) -> Result<Plan> {
        inputs::validate_plan_title(&input.title)?;
        self.repo.create(workspace_id, input).await
    }

    /// Fetch a shared plan.
    pub async fn get(&self, id: PlanId) -> Result<Plan> {
        self.repo.get(id).await
    }

    /// List every shared plan in a workspace.
    pub async fn list(&self, workspace_id: &WorkspaceId) -> Result<Vec<Plan>> {
        self.repo.list(workspace_id).await
    }

    /// Update a shared plan's title/content.
    pub async fn update(&self, id: PlanId, input: PlanInput) -> Result<Plan> {
        inputs::validate_plan_title(&input.title)?;
        self.repo.update(id, input).await
    }

    /// Delete a shared plan.
    pub async fn delete(&self, id: PlanId) -> Result<()> {
        self.repo.delete(id).await
    }

    /// Link a shared plan to an issue.
    pub async fn link(&self, issue_id: &IssueId, plan_id: PlanId) -> Result<()> {
        self.repo.link(issue_id, plan_id).await
    }

    /// Unlink a shared plan from an issue.
    pub async fn unlink(&self, issue_id: &IssueId, plan_id: PlanId) -> Result<()> {
        self.repo.unlink(issue_id, plan_id).await
    }

    /// Resolve an issue's full plan context (inline, parent, shared).
    pub async fn context_for(&self, issue_id: &IssueId) -> Result<PlanContext> {
        self.plan_context.context_for(issue_id).await
    }

    /// The full version history of an issue's inline plan, newest first.
    pub async fn history_for(&self, issue_id: &IssueId) -> Result<Vec<Comment>> {
        self.plan_context.history_for(issue_id).await
    }

    /// Set (append a new version of) an issue's inline plan, rejecting
    /// empty text.
    pub async fn set_inline_plan(&self, issue_id: &IssueId, text: String, actor: &str) -> Result<Comment> {
        inputs::validate_comment_text(&text)?;
        self.plan_context.set_inline_plan(issue_id, text, actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::inputs::{NewIssue, NewWorkspace};
    use arc_core::Error;
    use arc_storage::{IssueRepository, WorkspaceRepository};

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
    async fn rejects_blank_plan_title() {
        let (engine, ws_id, _) = fixture().await;
        let service = PlanService::new(engine);
        let err = service
            .create(
                &ws_id,
                PlanInput {
                    title: "   ".into(),
                    content: "x".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn set_inline_plan_rejects_empty_text() {
        let (engine, _, issue_id) = fixture().await;
        let service = PlanService::new(engine);
        let err = service.set_inline_plan(&issue_id, "  ".into(), "cli").await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn link_shared_plan_appears_in_context() {
        let (engine, ws_id, issue_id) = fixture().await;
        let service = PlanService::new(engine);
        let plan = service
            .create(
                &ws_id,
                PlanInput {
                    title: "Launch".into(),
                    content: "steps".into(),
                },
            )
            .await
            .unwrap();
        service.link(&issue_id, plan.id).await.unwrap();
        let context = service.context_for(&issue_id).await.unwrap();
        assert!(context.has_plan());
    }
}
