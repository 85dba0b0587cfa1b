//! Closed value sets for the issue graph.
//!
//! Status, type, dependency type, sort policy, event type, and comment type
//! are all represented as tagged enums rather than free strings, so an
//! invalid value is rejected at the parse boundary rather than surfacing as
//! a silent no-op deeper in the graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Open and available to be picked up.
    Open,
    /// Currently being worked on.
    InProgress,
    /// Blocked by an unmet dependency.
    Blocked,
    /// Deliberately deferred.
    Deferred,
    /// Completed; `closed_at` is set.
    Closed,
}

impl IssueStatus {
    /// Every valid status, for enumeration validation.
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Blocked,
        IssueStatus::Deferred,
        IssueStatus::Closed,
    ];

    /// The wire/storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Blocked => "blocked",
            IssueStatus::Deferred => "deferred",
            IssueStatus::Closed => "closed",
        }
    }

    /// True for [`IssueStatus::Open`] and [`IssueStatus::InProgress`], the
    /// two statuses the ready-work query admits as candidates.
    pub fn is_open_like(&self) -> bool {
        matches!(self, IssueStatus::Open | IssueStatus::InProgress)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueStatus::Open),
            "in_progress" => Ok(IssueStatus::InProgress),
            "blocked" => Ok(IssueStatus::Blocked),
            "deferred" => Ok(IssueStatus::Deferred),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!("invalid issue status: {other}")),
        }
    }
}

/// The kind of work an issue represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// A defect.
    Bug,
    /// A new capability.
    Feature,
    /// General work not otherwise categorized.
    Task,
    /// A parent issue gating its children.
    Epic,
    /// Maintenance work.
    Chore,
}

impl IssueType {
    /// Every valid issue type, for enumeration validation.
    pub const ALL: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::Feature,
        IssueType::Task,
        IssueType::Epic,
        IssueType::Chore,
    ];

    /// The wire/storage string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::Feature => "feature",
            IssueType::Task => "task",
            IssueType::Epic => "epic",
            IssueType::Chore => "chore",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bug" => Ok(IssueType::Bug),
            "feature" => Ok(IssueType::Feature),
            "task" => Ok(IssueType::Task),
            "epic" => Ok(IssueType::Epic),
            "chore" => Ok(IssueType::Chore),
            other => Err(format!("invalid issue type: {other}")),
        }
    }
}

/// The kind of edge between two issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    /// `B` must close before `A` can be worked — blocks readiness.
    Blocks,
    /// `A` is a child of the epic `B` — blocks readiness until `B` closes.
    ParentChild,
    /// Informational link only.
    Related,
    /// `A` was found while working on `B`.
    DiscoveredFrom,
}

impl DependencyType {
    /// Every valid dependency type, for enumeration validation.
    pub const ALL: [DependencyType; 4] = [
        DependencyType::Blocks,
        DependencyType::ParentChild,
        DependencyType::Related,
        DependencyType::DiscoveredFrom,
    ];

    /// The wire/storage string for this dependency type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::ParentChild => "parent-child",
            DependencyType::Related => "related",
            DependencyType::DiscoveredFrom => "discovered-from",
        }
    }

    /// Whether this edge type participates in readiness/blocking
    /// computation: `blocks` and `parent-child` are blocking; `related` and
    /// `discovered-from` are informational.
    pub fn is_blocking(&self) -> bool {
        matches!(self, DependencyType::Blocks | DependencyType::ParentChild)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocks" => Ok(DependencyType::Blocks),
            "parent-child" => Ok(DependencyType::ParentChild),
            "related" => Ok(DependencyType::Related),
            "discovered-from" => Ok(DependencyType::DiscoveredFrom),
            other => Err(format!("invalid dependency type: {other}")),
        }
    }
}

/// Whether a [`crate::Comment`] is a regular note or a plan version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    /// An ordinary free-form note.
    Comment,
    /// A plan document version (see the plan context aggregator).
    Plan,
}

impl CommentType {
    /// The wire/storage string for this comment type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentType::Comment => "comment",
            CommentType::Plan => "plan",
        }
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(CommentType::Comment),
            "plan" => Ok(CommentType::Plan),
            other => Err(format!("invalid comment type: {other}")),
        }
    }
}

/// The audit-trail vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// The issue was created.
    Created,
    /// A field other than status was updated.
    Updated,
    /// The status field changed.
    StatusChanged,
    /// A comment was added.
    Commented,
    /// The issue was closed.
    Closed,
    /// The issue was reopened.
    Reopened,
    /// A dependency edge was added.
    DependencyAdded,
    /// A dependency edge was removed.
    DependencyRemoved,
    /// A label was attached.
    LabelAdded,
    /// A label was detached.
    LabelRemoved,
}

impl EventType {
    /// The wire/storage string for this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Created => "created",
            EventType::Updated => "updated",
            EventType::StatusChanged => "status_changed",
            EventType::Commented => "commented",
            EventType::Closed => "closed",
            EventType::Reopened => "reopened",
            EventType::DependencyAdded => "dependency_added",
            EventType::DependencyRemoved => "dependency_removed",
            EventType::LabelAdded => "label_added",
            EventType::LabelRemoved => "label_removed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(EventType::Created),
            "updated" => Ok(EventType::Updated),
            "status_changed" => Ok(EventType::StatusChanged),
            "commented" => Ok(EventType::Commented),
            "closed" => Ok(EventType::Closed),
            "reopened" => Ok(EventType::Reopened),
            "dependency_added" => Ok(EventType::DependencyAdded),
            "dependency_removed" => Ok(EventType::DependencyRemoved),
            "label_added" => Ok(EventType::LabelAdded),
            "label_removed" => Ok(EventType::LabelRemoved),
            other => Err(format!("invalid event type: {other}")),
        }
    }
}

/// Ready-work result ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Recent issues (updated within the last 48 hours) first by priority,
    /// older issues after by age. The default policy.
    #[default]
    Hybrid,
    /// Strict priority ordering.
    Priority,
    /// Creation date ascending.
    Oldest,
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortPolicy::Hybrid => "hybrid",
            SortPolicy::Priority => "priority",
            SortPolicy::Oldest => "oldest",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hybrid" => Ok(SortPolicy::Hybrid),
            "priority" => Ok(SortPolicy::Priority),
            "oldest" => Ok(SortPolicy::Oldest),
            other => Err(format!("invalid sort policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn issue_status_round_trips() {
        for status in IssueStatus::ALL {
            let s = status.to_string();
            assert_eq!(s.parse::<IssueStatus>().unwrap(), status);
        }
    }

    #[rstest]
    #[case(DependencyType::Blocks, true)]
    #[case(DependencyType::ParentChild, true)]
    #[case(DependencyType::Related, false)]
    #[case(DependencyType::DiscoveredFrom, false)]
    fn dependency_type_blocking_matches_spec(#[case] dep_type: DependencyType, #[case] expected: bool) {
        assert_eq!(dep_type.is_blocking(), expected);
    }

    #[test]
    fn dependency_type_wire_spelling_is_kebab_case() {
        assert_eq!(DependencyType::ParentChild.as_str(), "parent-child");
        assert_eq!(DependencyType::DiscoveredFrom.as_str(), "discovered-from");
    }

    #[test]
    fn sort_policy_defaults_to_hybrid() {
        assert_eq!(SortPolicy::default(), SortPolicy::Hybrid);
    }
}
