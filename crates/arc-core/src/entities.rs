//! Domain entities: the rows of the issue graph.

use crate::enums::{CommentType, DependencyType, EventType, IssueStatus, IssueType};
use crate::ids::{CommentId, EventId, IssueId, PlanId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A container for issues; the top-level tenancy boundary.
///
/// Deletion cascades to every issue, label, plan, and config row the
/// workspace owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Opaque identifier.
    pub id: WorkspaceId,
    /// Unique display name (at most 100 characters).
    pub name: String,
    /// Optional filesystem path this workspace corresponds to.
    pub path: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Short namespace string (at most 10 characters) used in issue ids.
    pub prefix: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// `<prefix>.<6-char base-36 hash>`.
    pub id: IssueId,
    /// The workspace this issue belongs to.
    pub workspace_id: WorkspaceId,
    /// Required, 1-500 characters.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: IssueStatus,
    /// 0 (critical) through 4 (lowest).
    pub priority: u8,
    /// Manual ordering hint; `0` means unranked and sorts last.
    pub rank: i64,
    /// The kind of work this issue represents.
    pub issue_type: IssueType,
    /// The person or agent assigned to this issue, if any.
    pub assignee: Option<String>,
    /// An external tracker reference (e.g. `"gh-123"`).
    pub external_ref: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp. Monotonic per issue across mutations.
    pub updated_at: DateTime<Utc>,
    /// Set exactly when `status == Closed`.
    pub closed_at: Option<DateTime<Utc>>,
    /// The reason given when the issue was closed, if any.
    pub close_reason: Option<String>,
}

/// A directed, typed edge from `issue_id` to `depends_on_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    /// The dependent issue.
    pub issue_id: IssueId,
    /// The issue depended upon.
    pub depends_on_id: IssueId,
    /// The kind of relationship.
    pub dep_type: DependencyType,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
    /// Who created the edge.
    pub created_by: String,
}

/// A tagging vocabulary entry scoped to a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// The owning workspace.
    pub workspace_id: WorkspaceId,
    /// The label name (part of the composite primary key).
    pub name: String,
    /// An optional display color (e.g. a hex string).
    pub color: Option<String>,
    /// A human-readable description of what the label means.
    pub description: Option<String>,
}

/// Free-form text attached to an issue.
///
/// A comment with `comment_type == Plan` is a version of that issue's inline
/// plan; see the plan context aggregator for how these are resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Auto-assigned id.
    pub id: CommentId,
    /// The issue this comment is attached to.
    pub issue_id: IssueId,
    /// The actor who wrote the comment.
    pub author: String,
    /// The comment body.
    pub text: String,
    /// Whether this is a plain comment or a plan version.
    pub comment_type: CommentType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A first-class shared plan document, linked many-to-many with issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Auto-assigned id.
    pub id: PlanId,
    /// The owning workspace.
    pub workspace_id: WorkspaceId,
    /// Title, at most 200 characters.
    pub title: String,
    /// The plan body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A workspace-scoped configuration key/value pair.
///
/// Free-form settings (e.g. a default assignee, an integration token) that
/// don't warrant their own column on [`Workspace`]. Owned by the workspace;
/// deleted along with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// The owning workspace.
    pub workspace_id: WorkspaceId,
    /// The configuration key (part of the composite primary key).
    pub key: String,
    /// The configuration value.
    pub value: String,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts for `GET /workspaces/{ws}/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceStats {
    /// The workspace these counts describe.
    pub workspace_id: WorkspaceId,
    /// Total issue count, open or closed.
    pub total_issues: i64,
    /// Issues with `status = open`.
    pub open: i64,
    /// Issues with `status = in_progress`.
    pub in_progress: i64,
    /// Issues with `status = blocked`.
    pub blocked: i64,
    /// Issues with `status = deferred`.
    pub deferred: i64,
    /// Issues with `status = closed`.
    pub closed: i64,
    /// Mean of `closed_at - created_at` in hours, over closed issues only.
    /// `None` when no issue has closed yet.
    pub avg_lead_time_hours: Option<f64>,
}

/// An append-only audit-trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Auto-assigned id. Strictly increasing across all events.
    pub id: EventId,
    /// The issue this event describes.
    pub issue_id: IssueId,
    /// The kind of mutation that produced this event.
    pub event_type: EventType,
    /// The actor who performed the mutation (from `X-Actor`, default `cli`).
    pub actor: String,
    /// The value before the mutation, if meaningful for this event type.
    pub old_value: Option<String>,
    /// The value after the mutation, if meaningful for this event type.
    pub new_value: Option<String>,
    /// An optional free-form note (e.g. a close reason).
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
