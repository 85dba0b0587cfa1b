//! The service layer: validation, defaulting, and cross-entity workflow
//! composed on top of `arc-storage` repositories and the `arc-graph`
//! resolver.
//!
//! One struct per aggregate root, each re-fetching the entity after a
//! mutation so the returned object reflects the post-condition.

pub mod comments;
pub mod config;
pub mod dependencies;
pub mod events;
pub mod issues;
pub mod labels;
pub mod plans;
pub mod workspaces;

pub use comments::CommentService;
pub use config::ConfigService;
pub use dependencies::DependencyService;
pub use events::EventService;
pub use issues::IssueService;
pub use labels::LabelService;
pub use plans::PlanService;
pub use workspaces::WorkspaceService;
