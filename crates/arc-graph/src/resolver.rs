//! Ready-work, blocked-work, and is-blocked resolution.
//!
//! An issue is *ready* iff it is open or in-progress and every outbound
//! blocking edge (`blocks` or `parent-child`) points at a closed issue. An
//! issue is *blocked-visible* iff it is not closed and has at least one
//! outbound blocking edge pointing at a non-closed issue. `parent-child` is
//! treated as blocking so an epic gates its children.

use std::collections::HashMap;
use std::sync::Arc;

use arc_core::inputs::{IssueFilter, ReadyWorkFilter};
use arc_core::{Issue, IssueId, IssueStatus, Result, SortPolicy, WorkspaceId};
use arc_storage::{DependencyRepository, IssueRepository, StorageEngine};
use chrono::{DateTime, Duration, Utc};

/// How long an issue counts as "recent" for the `hybrid` sort policy.
const HYBRID_RECENCY_WINDOW_HOURS: i64 = 48;

/// Secondary filters plus the sort policy for a ready-work query.
#[derive(Debug, Clone, Default)]
pub struct ReadyWorkOptions {
    /// Ordering strategy.
    pub sort: SortPolicy,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// In-memory secondary filters.
    pub filter: ReadyWorkFilter,
}

/// A blocked-visible issue enriched with the edges that block it.
#[derive(Debug, Clone)]
pub struct BlockedIssue {
    /// The blocked issue itself.
    pub issue: Issue,
    /// How many outbound blocking edges target a non-closed issue.
    pub blocked_by_count: usize,
    /// The ids of those blocking issues, in priority-ascending order.
    pub blocked_by: Vec<IssueId>,
}

/// Computes ready-work, blocked-work, and is-blocked queries over a
/// workspace's issue graph.
pub struct GraphResolver {
    issues: IssueRepository,
    dependencies: DependencyRepository,
}

impl GraphResolver {
    /// Build a resolver over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            issues: IssueRepository::new(engine.clone()),
            dependencies: DependencyRepository::new(engine),
        }
    }

    /// The ready set for a workspace: open-like issues with no unmet
    /// blocking dependency, sorted per `options.sort` and capped at
    /// `options.limit`.
    pub async fn ready_work(&self, workspace_id: &WorkspaceId, options: &ReadyWorkOptions) -> Result<Vec<Issue>> {
        let candidates = self.issues.list_open_like(workspace_id).await?;

        let mut ready = Vec::with_capacity(candidates.len());
        for issue in candidates {
            let blocking = self.dependencies.blocking_targets(&issue.id).await?;
            let unmet = blocking.iter().filter(|(_, status)| *status != IssueStatus::Closed).count();
            if unmet == 0 {
                ready.push(issue);
            }
        }

        let mut filtered: Vec<Issue> = ready.into_iter().filter(|i| passes_ready_filter(i, &options.filter)).collect();
        sort_by_policy(&mut filtered, options.sort);

        if let Some(limit) = options.limit {
            let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
            filtered.truncate(limit);
        }
        Ok(filtered)
    }

    /// The blocked-visible set for a workspace, each entry enriched with
    /// its blocking issue ids ordered by priority ascending.
    pub async fn blocked_work(&self, workspace_id: &WorkspaceId, limit: Option<i64>) -> Result<Vec<BlockedIssue>> {
        let candidates = self.issues.list_non_closed(workspace_id).await?;
        let all = self.issues.list(workspace_id, &IssueFilter::default()).await?;
        let by_id: HashMap<&IssueId, &Issue> = all.iter().map(|i| (&i.id, i)).collect();

        let mut blocked = Vec::new();
        for issue in candidates {
            let targets = self.dependencies.blocking_targets(&issue.id).await?;
            let mut open_blockers: Vec<&Issue> = targets
                .iter()
                .filter(|(_, status)| *status != IssueStatus::Closed)
                .filter_map(|(id, _)| by_id.get(id).copied())
                .collect();
            if open_blockers.is_empty() {
                continue;
            }
            open_blockers.sort_by_key(|i| i.priority);
            blocked.push(BlockedIssue {
                blocked_by_count: open_blockers.len(),
                blocked_by: open_blockers.iter().map(|i| i.id.clone()).collect(),
                issue,
            });
        }

        blocked.sort_by(|a, b| a.issue.id.cmp(&b.issue.id));
        if let Some(limit) = limit {
            let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
            blocked.truncate(limit);
        }
        Ok(blocked)
    }

    /// Whether `issue_id` is currently blocked, plus the ids of its open
    /// blocking issues. Used by the service layer before surfacing "ready"
    /// hints to a client.
    pub async fn is_blocked(&self, issue_id: &IssueId) -> Result<(bool, Vec<IssueId>)> {
        let targets = self.dependencies.blocking_targets(issue_id).await?;
        let open: Vec<IssueId> = targets
            .into_iter()
            .filter(|(_, status)| *status != IssueStatus::Closed)
            .map(|(id, _)| id)
            .collect();
        Ok((!open.is_empty(), open))
    }
}

fn passes_ready_filter(issue: &Issue, filter: &ReadyWorkFilter) -> bool {
    if let Some(issue_type) = filter.issue_type {
        if issue.issue_type != issue_type {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if issue.priority != priority {
            return false;
        }
    }
    if filter.unassigned_only && issue.assignee.is_some() {
        return false;
    }
    if let Some(assignee) = &filter.assignee {
        if issue.assignee.as_deref() != Some(assignee.as_str()) {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if issue.status != status {
            return false;
        }
    }
    true
}

/// `0` is "unranked, sorts last"; map it to `i64::MAX` so the natural
/// ascending comparison puts every ranked issue first without a
/// special-cased branch.
fn rank_sort_key(rank: i64) -> i64 {
    if rank == 0 {
        i64::MAX
    } else {
        rank
    }
}

fn is_recent(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - updated_at <= Duration::hours(HYBRID_RECENCY_WINDOW_HOURS)
}

/// Sort `issues` in place per `policy`. Every policy appends the issue id
/// as a final tie-breaker so ordering is fully deterministic when priority,
/// rank, and timestamps coincide.
fn sort_by_policy(issues: &mut [Issue], policy: SortPolicy) {
    match policy {
        SortPolicy::Priority => {
            issues.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| rank_sort_key(a.rank).cmp(&rank_sort_key(b.rank)))
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        SortPolicy::Oldest => {
            issues.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        }
        SortPolicy::Hybrid => {
            let now = Utc::now();
            issues.sort_by(|a, b| {
                let a_recent = is_recent(a.updated_at, now);
                let b_recent = is_recent(b.updated_at, now);
                match (a_recent, b_recent) {
                    (true, false) => std::cmp::Ordering::Less,
                    (false, true) => std::cmp::Ordering::Greater,
                    (true, true) => a
                        .priority
                        .cmp(&b.priority)
                        .then_with(|| rank_sort_key(a.rank).cmp(&rank_sort_key(b.rank)))
                        .then_with(|| a.created_at.cmp(&b.created_at))
                        .then_with(|| a.id.cmp(&b.id)),
                    (false, false) => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::inputs::{NewDependency, NewIssue, NewWorkspace};
    use arc_core::{DependencyType, IssueType};
    use arc_storage::{DependencyRepository as DepRepo, IssueRepository as IssRepo, WorkspaceRepository};

    async fn workspace() -> (Arc<StorageEngine>, WorkspaceId) {
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

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            title: title.into(),
            description: None,
            priority: None,
            issue_type: None,
            assignee: None,
            external_ref: None,
            rank: None,
        }
    }

    #[tokio::test]
    async fn epic_gates_children() {
        let (engine, ws_id) = workspace().await;
        let issues = IssRepo::new(engine.clone());
        let deps = DepRepo::new(engine.clone());
        let resolver = GraphResolver::new(engine.clone());

        let epic = issues
            .create(
                &ws_id,
                NewIssue {
                    issue_type: Some(IssueType::Epic),
                    ..new_issue("epic")
                },
                "cli",
            )
            .await
            .unwrap();
        let a = issues.create(&ws_id, new_issue("a"), "cli").await.unwrap();
        let b = issues.create(&ws_id, new_issue("b"), "cli").await.unwrap();

        deps.add(
            &a.id,
            NewDependency {
                depends_on_id: epic.id.clone(),
                dep_type: DependencyType::ParentChild,
            },
            "cli",
        )
        .await
        .unwrap();
        deps.add(
            &b.id,
            NewDependency {
                depends_on_id: epic.id.clone(),
                dep_type: DependencyType::ParentChild,
            },
            "cli",
        )
        .await
        .unwrap();

        let ready = resolver.ready_work(&ws_id, &ReadyWorkOptions::default()).await.unwrap();
        assert_eq!(ready.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec![epic.id.as_str()]);

        issues.close(&epic.id, None, "cli").await.unwrap();
        let mut ready = resolver.ready_work(&ws_id, &ReadyWorkOptions::default()).await.unwrap();
        ready.sort_by(|x, y| x.id.cmp(&y.id));
        let mut expected = vec![a.id.clone(), b.id.clone()];
        expected.sort();
        assert_eq!(ready.into_iter().map(|i| i.id).collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn blocker_chain() {
        let (engine, ws_id) = workspace().await;
        let issues = IssRepo::new(engine.clone());
        let deps = DepRepo::new(engine.clone());
        let resolver = GraphResolver::new(engine.clone());

        let x = issues.create(&ws_id, new_issue("x"), "cli").await.unwrap();
        let y = issues.create(&ws_id, new_issue("y"), "cli").await.unwrap();
        let z = issues.create(&ws_id, new_issue("z"), "cli").await.unwrap();

        deps.add(
            &y.id,
            NewDependency {
                depends_on_id: x.id.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();
        deps.add(
            &z.id,
            NewDependency {
                depends_on_id: y.id.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();

        let ready = resolver.ready_work(&ws_id, &ReadyWorkOptions::default()).await.unwrap();
        assert_eq!(ready.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec![x.id.as_str()]);

        let blocked = resolver.blocked_work(&ws_id, None).await.unwrap();
        assert_eq!(blocked.len(), 2);
        let y_entry = blocked.iter().find(|b| b.issue.id == y.id).unwrap();
        assert_eq!(y_entry.blocked_by, vec![x.id.clone()]);
        let z_entry = blocked.iter().find(|b| b.issue.id == z.id).unwrap();
        assert_eq!(z_entry.blocked_by, vec![y.id.clone()]);

        issues.close(&x.id, None, "cli").await.unwrap();
        let ready = resolver.ready_work(&ws_id, &ReadyWorkOptions::default()).await.unwrap();
        assert_eq!(ready.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec![y.id.as_str()]);

        issues.close(&y.id, None, "cli").await.unwrap();
        let ready = resolver.ready_work(&ws_id, &ReadyWorkOptions::default()).await.unwrap();
        assert_eq!(ready.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec![z.id.as_str()]);
    }

    #[tokio::test]
    async fn is_blocked_reports_open_blockers() {
        let (engine, ws_id) = workspace().await;
        let issues = IssRepo::new(engine.clone());
        let deps = DepRepo::new(engine.clone());
        let resolver = GraphResolver::new(engine.clone());

        let a = issues.create(&ws_id, new_issue("a"), "cli").await.unwrap();
        let b = issues.create(&ws_id, new_issue("b"), "cli").await.unwrap();
        deps.add(
            &a.id,
            NewDependency {
                depends_on_id: b.id.clone(),
                dep_type: DependencyType::Blocks,
            },
            "cli",
        )
        .await
        .unwrap();

        let (blocked, blockers) = resolver.is_blocked(&a.id).await.unwrap();
        assert!(blocked);
        assert_eq!(blockers, vec![b.id.clone()]);

        issues.close(&b.id, None, "cli").await.unwrap();
        let (blocked, blockers) = resolver.is_blocked(&a.id).await.unwrap();
        assert!(!blocked);
        assert!(blockers.is_empty());
    }

    #[test]
    fn priority_policy_orders_by_priority_then_rank_then_age() {
        let now = Utc::now();
        let mk = |id: &str, priority: u8, rank: i64, age_days: i64| Issue {
            id: IssueId::new(id),
            workspace_id: WorkspaceId::new("ws"),
            title: id.into(),
            description: None,
            status: IssueStatus::Open,
            priority,
            rank,
            issue_type: IssueType::Task,
            assignee: None,
            external_ref: None,
            created_at: now - Duration::days(age_days),
            updated_at: now - Duration::days(age_days),
            closed_at: None,
            close_reason: None,
        };

        let mut issues = vec![
            mk("p0-old", 0, 0, 7),
            mk("p2-fresh", 2, 0, 0),
            mk("p3-oldest", 3, 0, 30),
        ];
        // p2-fresh's updated_at needs to be "1 hour ago", not "today"; age_days=0
        // already satisfies "within 48h" for the hybrid test below, but here we
        // only exercise the `priority` policy which ignores recency entirely.
        sort_by_policy(&mut issues, SortPolicy::Priority);
        assert_eq!(
            issues.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["p0-old", "p2-fresh", "p3-oldest"]
        );
    }

    #[test]
    fn oldest_policy_orders_by_creation_time() {
        let now = Utc::now();
        let mk = |id: &str, age_days: i64| Issue {
            id: IssueId::new(id),
            workspace_id: WorkspaceId::new("ws"),
            title: id.into(),
            description: None,
            status: IssueStatus::Open,
            priority: 2,
            rank: 0,
            issue_type: IssueType::Task,
            assignee: None,
            external_ref: None,
            created_at: now - Duration::days(age_days),
            updated_at: now - Duration::days(age_days),
            closed_at: None,
            close_reason: None,
        };

        let mut issues = vec![mk("p0-old", 7), mk("p2-fresh", 0), mk("p3-oldest", 30)];
        sort_by_policy(&mut issues, SortPolicy::Oldest);
        assert_eq!(
            issues.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["p3-oldest", "p0-old", "p2-fresh"]
        );
    }

    #[test]
    fn hybrid_policy_prefers_recent_by_priority_then_older_by_age() {
        let now = Utc::now();
        let mk = |id: &str, priority: u8, age: Duration| Issue {
            id: IssueId::new(id),
            workspace_id: WorkspaceId::new("ws"),
            title: id.into(),
            description: None,
            status: IssueStatus::Open,
            priority,
            rank: 0,
            issue_type: IssueType::Task,
            assignee: None,
            external_ref: None,
            created_at: now - age,
            updated_at: now - age,
            closed_at: None,
            close_reason: None,
        };

        let mut issues = vec![
            mk("p0-old", 0, Duration::days(7)),
            mk("p2-fresh", 2, Duration::hours(1)),
            mk("p3-oldest", 3, Duration::days(30)),
        ];
        sort_by_policy(&mut issues, SortPolicy::Hybrid);
        assert_eq!(
            issues.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec!["p2-fresh", "p3-oldest", "p0-old"]
        );
    }

    #[test]
    fn rank_zero_sorts_after_any_ranked_issue() {
        let now = Utc::now();
        let mk = |id: &str, rank: i64| Issue {
            id: IssueId::new(id),
            workspace_id: WorkspaceId::new("ws"),
            title: id.into(),
            description: None,
            status: IssueStatus::Open,
            priority: 2,
            rank,
            issue_type: IssueType::Task,
            assignee: None,
            external_ref: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
            close_reason: None,
        };

        let mut issues = vec![mk("unranked", 0), mk("ranked", 5)];
        sort_by_policy(&mut issues, SortPolicy::Priority);
        assert_eq!(issues[0].id.as_str(), "ranked");
        assert_eq!(issues[1].id.as_str(), "unranked");
    }
}
