//! The storage engine and entity repositories for the Arc issue graph
//! engine.
//!
//! This crate is the only one in the workspace that depends on `rusqlite`.
//! Every repository method returns `arc_core` domain types; callers above
//! this crate never see a row or a SQL string.

pub mod engine;
pub mod error;
pub mod repositories;
pub mod rows;
pub mod schema;

pub use arc_core::{Error, Result};
pub use engine::StorageEngine;
pub use repositories::{
    CommentRepository, ConfigRepository, DependencyRepository, EventRepository, IssueRepository,
    LabelRepository, PlanRepository, WorkspaceRepository,
};
