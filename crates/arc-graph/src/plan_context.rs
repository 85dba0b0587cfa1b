//! Plan context aggregation across the three plan patterns: inline (latest
//! `plan`-typed comment), parent (the inline plan of the unique outbound
//! `parent-child` target), and shared (`Plan` rows linked via `issue_plans`).
//!
//! Plan inheritance is computed at read time by walking one `parent-child`
//! edge, never stored as derived state.

use std::sync::Arc;

use arc_core::{Comment, CommentType, IssueId, Plan, Result};
use arc_storage::{CommentRepository, DependencyRepository, PlanRepository, StorageEngine};

/// The resolved plan context for an issue.
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    /// The issue's own most recent `plan`-typed comment, if any.
    pub inline_plan: Option<Comment>,
    /// The parent issue reached via the unique outbound `parent-child`
    /// edge, if one exists.
    pub parent_issue_id: Option<IssueId>,
    /// The parent's inline plan, if both a parent and a plan on it exist.
    pub parent_plan: Option<Comment>,
    /// Every shared plan linked to the issue, newest-updated first.
    pub shared_plans: Vec<Plan>,
}

impl PlanContext {
    /// True iff any of the three sources is present.
    pub fn has_plan(&self) -> bool {
        self.inline_plan.is_some() || self.parent_plan.is_some() || !self.shared_plans.is_empty()
    }
}

/// Resolves plan context for an issue from the three sources.
pub struct PlanContextAggregator {
    comments: CommentRepository,
    dependencies: DependencyRepository,
    plans: PlanRepository,
}

impl PlanContextAggregator {
    /// Build an aggregator over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            comments: CommentRepository::new(engine.clone()),
            dependencies: DependencyRepository::new(engine.clone()),
            plans: PlanRepository::new(engine),
        }
    }

    /// Resolve the full plan context for `issue_id`.
    pub async fn context_for(&self, issue_id: &IssueId) -> Result<PlanContext> {
        let inline_plan = self.comments.latest_plan(issue_id).await?;
        let parent_issue_id = self.dependencies.parent_of(issue_id).await?;
        let parent_plan = match &parent_issue_id {
            Some(parent_id) => self.comments.latest_plan(parent_id).await?,
            None => None,
        };
        let shared_plans = self.plans.list_for_issue(issue_id).await?;

        Ok(PlanContext {
            inline_plan,
            parent_issue_id,
            parent_plan,
            shared_plans,
        })
    }

    /// The full descending-by-time history of `plan`-typed comments on an
    /// issue. The "current" inline plan is always `history[0]`.
    pub async fn history_for(&self, issue_id: &IssueId) -> Result<Vec<Comment>> {
        self.comments.list_for_issue(issue_id, CommentType::Plan).await
    }

    /// Append a new `plan`-typed comment — how an inline plan is set:
    /// earlier versions are retained, and the newest becomes the current
    /// inline plan.
    pub async fn set_inline_plan(&self, issue_id: &IssueId, text: String, actor: &str) -> Result<Comment> {
        self.comments.add(issue_id, text, CommentType::Plan, actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::inputs::{NewDependency, NewIssue, NewWorkspace};
    use arc_core::DependencyType;
    use arc_storage::{IssueRepository, WorkspaceRepository};

    #[tokio::test]
    async fn plan_inheritance_across_a_parent_child_edge() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());
        let deps = DependencyRepository::new(engine.clone());
        let aggregator = PlanContextAggregator::new(engine.clone());

        let ws = workspaces
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap();
        let new_issue = |title: &str| NewIssue {
            title: title.into(),
            description: None,
            priority: None,
            issue_type: None,
            assignee: None,
            external_ref: None,
            rank: None,
        };
        let parent = issues.create(&ws.id, new_issue("parent"), "cli").await.unwrap();
        let child = issues.create(&ws.id, new_issue("child"), "cli").await.unwrap();
        deps.add(
            &child.id,
            NewDependency {
                depends_on_id: parent.id.clone(),
                dep_type: DependencyType::ParentChild,
            },
            "cli",
        )
        .await
        .unwrap();

        aggregator.set_inline_plan(&parent.id, "phase 1".into(), "cli").await.unwrap();

        let context = aggregator.context_for(&child.id).await.unwrap();
        assert_eq!(context.parent_issue_id, Some(parent.id.clone()));
        assert_eq!(context.parent_plan.as_ref().map(|c| c.text.as_str()), Some("phase 1"));
        assert!(context.inline_plan.is_none());
        assert!(context.has_plan());

        aggregator.set_inline_plan(&child.id, "do X".into(), "cli").await.unwrap();
        let context = aggregator.context_for(&child.id).await.unwrap();
        assert_eq!(context.inline_plan.as_ref().map(|c| c.text.as_str()), Some("do X"));
        assert_eq!(context.parent_plan.as_ref().map(|c| c.text.as_str()), Some("phase 1"));
    }

    #[tokio::test]
    async fn has_plan_true_for_shared_plan_link_alone() {
        let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
        let workspaces = WorkspaceRepository::new(engine.clone());
        let issues = IssueRepository::new(engine.clone());
        let plans = arc_storage::PlanRepository::new(engine.clone());
        let aggregator = PlanContextAggregator::new(engine.clone());

        let ws = workspaces
            .create(NewWorkspace {
                name: "acme".into(),
                prefix: "arc".into(),
                path: None,
                description: None,
            })
            .await
            .unwrap();
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
        let plan = plans
            .create(
                &ws.id,
                arc_core::inputs::PlanInput {
                    title: "Launch".into(),
                    content: "steps".into(),
                },
            )
            .await
            .unwrap();
        plans.link(&issue.id, plan.id).await.unwrap();

        let context = aggregator.context_for(&issue.id).await.unwrap();
        assert!(context.has_plan());
        assert_eq!(context.shared_plans.len(), 1);
    }
}
