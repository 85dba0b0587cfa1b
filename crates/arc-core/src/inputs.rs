//! Input shapes for creating and updating entities, plus query filters.
//!
//! These are the service layer's raw material: what the HTTP API hands it
//! after JSON decoding, before validation and defaulting.

use crate::enums::{CommentType, DependencyType, IssueStatus, IssueType, SortPolicy};
use crate::ids::IssueId;
use serde::Deserialize;

/// Maximum length for a workspace display name.
pub const MAX_WORKSPACE_NAME_LENGTH: usize = 100;
/// Maximum length for a workspace prefix.
pub const MAX_WORKSPACE_PREFIX_LENGTH: usize = 10;
/// Maximum length for an issue title.
pub const MAX_ISSUE_TITLE_LENGTH: usize = 500;
/// Maximum length for a shared plan title.
pub const MAX_PLAN_TITLE_LENGTH: usize = 200;
/// Maximum length for a configuration key.
pub const MAX_CONFIG_KEY_LENGTH: usize = 100;
/// Highest valid priority value (lowest urgency).
pub const MAX_PRIORITY: u8 = 4;
/// The priority assigned when none is given.
pub const DEFAULT_PRIORITY: u8 = 2;

/// Fields accepted when creating a workspace.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkspace {
    /// Unique display name.
    pub name: String,
    /// Short namespace string used in issue ids.
    pub prefix: String,
    /// Optional filesystem path.
    pub path: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Fields accepted when updating a workspace. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New filesystem path.
    pub path: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Fields accepted when creating an issue. The workspace id is taken from
/// the URL path, not this body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIssue {
    /// Required title, 1-500 characters.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Priority 0-4; defaults to 2 when absent.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Defaults to `task` when absent.
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    /// Optional assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Optional external reference.
    #[serde(default)]
    pub external_ref: Option<String>,
    /// Optional manual rank; `0` or absent means unranked.
    #[serde(default)]
    pub rank: Option<i64>,
}

/// A recognized field update for an issue. The service layer accepts a map
/// of field name to value and applies only the keys it recognizes
/// (`title`, `description`, `status`, `priority`, `issue_type`, `assignee`,
/// `external_ref`, `rank`); this type is the typed equivalent after
/// decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description. A present-but-empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<IssueStatus>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<u8>,
    /// New issue type.
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    /// New assignee. A present-but-empty string clears it.
    #[serde(default)]
    pub assignee: Option<String>,
    /// New external reference.
    #[serde(default)]
    pub external_ref: Option<String>,
    /// New rank.
    #[serde(default)]
    pub rank: Option<i64>,
}

impl IssueUpdate {
    /// Whether this update carries at least one recognized field. The
    /// service layer rejects an empty update map.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.issue_type.is_none()
            && self.assignee.is_none()
            && self.external_ref.is_none()
            && self.rank.is_none()
    }
}

/// Filters applied to `GET /workspaces/{ws}/issues`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    /// Restrict to a single status.
    #[serde(default)]
    pub status: Option<IssueStatus>,
    /// Restrict to a single issue type.
    #[serde(default, rename = "type")]
    pub issue_type: Option<IssueType>,
    /// Restrict to a single assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Substring match over title and description.
    #[serde(default)]
    pub q: Option<String>,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Number of results to skip.
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Secondary filters applied in memory after the ready/blocked base query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyWorkFilter {
    /// Restrict to a single issue type.
    pub issue_type: Option<IssueType>,
    /// Restrict to a single priority.
    pub priority: Option<u8>,
    /// Restrict to a single assignee.
    pub assignee: Option<String>,
    /// Restrict to issues with no assignee.
    pub unassigned_only: bool,
    /// Restrict to a single status (rarely used; ready work is normally
    /// restricted to open-like statuses already).
    pub status: Option<IssueStatus>,
}

/// Query parameters accepted by `GET /workspaces/{ws}/ready`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyWorkQuery {
    /// Sort policy; defaults to [`SortPolicy::Hybrid`].
    #[serde(default)]
    pub sort: Option<SortPolicy>,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, rename = "type")]
    /// Restrict to a single issue type.
    pub issue_type: Option<IssueType>,
    /// Restrict to a single priority.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Restrict to a single assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// Restrict to issues with no assignee.
    #[serde(default)]
    pub unassigned_only: Option<bool>,
}

/// A dependency edge as accepted from the HTTP body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDependency {
    /// The issue depended upon.
    pub depends_on_id: IssueId,
    /// The kind of relationship.
    pub dep_type: DependencyType,
}

/// Fields accepted when creating a label.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLabel {
    /// The label name.
    pub name: String,
    /// Optional display color.
    #[serde(default)]
    pub color: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields accepted when adding a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    /// The comment body; must be non-empty.
    pub text: String,
    /// Defaults to [`CommentType::Comment`] when absent.
    #[serde(default)]
    pub comment_type: Option<CommentType>,
}

/// Fields accepted when editing a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentUpdate {
    /// The new comment body.
    pub text: String,
}

/// Fields accepted when creating or updating a shared plan.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInput {
    /// Title, at most 200 characters.
    pub title: String,
    /// The plan body.
    pub content: String,
}

/// The body of `POST /workspaces/{ws}/issues/{id}/close`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloseIssue {
    /// The reason the issue was closed; may be empty.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The body of `POST /workspaces/{ws}/issues/{id}/plan` (append an inline
/// plan version).
#[derive(Debug, Clone, Deserialize)]
pub struct SetInlinePlan {
    /// The plan text.
    pub text: String,
}

/// The body of `PUT /workspaces/{ws}/config/{key}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetConfigEntry {
    /// The configuration value.
    pub value: String,
}

/// Validate a workspace name against its length bound.
pub fn validate_workspace_name(name: &str) -> Result<(), crate::Error> {
    if name.trim().is_empty() {
        return Err(crate::Error::validation("name", "name must not be empty"));
    }
    if name.chars().count() > MAX_WORKSPACE_NAME_LENGTH {
        return Err(crate::Error::validation(
            "name",
            format!("name must be at most {MAX_WORKSPACE_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate a workspace prefix against its length bound.
pub fn validate_workspace_prefix(prefix: &str) -> Result<(), crate::Error> {
    if prefix.trim().is_empty() {
        return Err(crate::Error::validation(
            "prefix",
            "prefix must not be empty",
        ));
    }
    if prefix.chars().count() > MAX_WORKSPACE_PREFIX_LENGTH {
        return Err(crate::Error::validation(
            "prefix",
            format!("prefix must be at most {MAX_WORKSPACE_PREFIX_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate an issue title against its length bound.
pub fn validate_issue_title(title: &str) -> Result<(), crate::Error> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::validation("title", "title must not be empty"));
    }
    if title.chars().count() > MAX_ISSUE_TITLE_LENGTH {
        return Err(crate::Error::validation(
            "title",
            format!("title must be at most {MAX_ISSUE_TITLE_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate a priority value against the `0..=4` bound.
pub fn validate_priority(priority: u8) -> Result<(), crate::Error> {
    if priority > MAX_PRIORITY {
        return Err(crate::Error::validation(
            "priority",
            format!("priority must be in range 0-{MAX_PRIORITY} (got {priority})"),
        ));
    }
    Ok(())
}

/// Validate a plan title against its length bound.
pub fn validate_plan_title(title: &str) -> Result<(), crate::Error> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::validation("title", "title must not be empty"));
    }
    if title.chars().count() > MAX_PLAN_TITLE_LENGTH {
        return Err(crate::Error::validation(
            "title",
            format!("title must be at most {MAX_PLAN_TITLE_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate comment text is non-empty.
pub fn validate_comment_text(text: &str) -> Result<(), crate::Error> {
    if text.trim().is_empty() {
        return Err(crate::Error::validation("text", "comment text must not be empty"));
    }
    Ok(())
}

/// Validate a configuration key against its length bound.
pub fn validate_config_key(key: &str) -> Result<(), crate::Error> {
    if key.trim().is_empty() {
        return Err(crate::Error::validation("key", "key must not be empty"));
    }
    if key.chars().count() > MAX_CONFIG_KEY_LENGTH {
        return Err(crate::Error::validation(
            "key",
            format!("key must be at most {MAX_CONFIG_KEY_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate a dependency edge does not self-reference.
pub fn validate_no_self_dependency(issue_id: &IssueId, depends_on_id: &IssueId) -> Result<(), crate::Error> {
    if issue_id == depends_on_id {
        return Err(crate::Error::validation(
            "depends_on_id",
            "an issue cannot depend on itself",
        ));
    }
    Ok(())
}
