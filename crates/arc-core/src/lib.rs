//! Domain types, enumerations, validation, and the error model shared by
//! every other crate in the Arc issue graph engine.
//!
//! This crate performs no I/O. It defines *what* an issue graph is; the
//! `arc-storage` crate defines how it is persisted, `arc-graph` how it is
//! queried for readiness, and `arc-service`/`arc-server` how it is mutated
//! and exposed over HTTP.

pub mod entities;
pub mod enums;
pub mod error;
pub mod id_generation;
pub mod ids;
pub mod inputs;

pub use entities::{Comment, ConfigEntry, Dependency, Event, Issue, Label, Plan, Workspace, WorkspaceStats};
pub use enums::{CommentType, DependencyType, EventType, IssueStatus, IssueType, SortPolicy};
pub use error::{Error, Result};
pub use ids::{CommentId, EventId, IssueId, PlanId, WorkspaceId};
