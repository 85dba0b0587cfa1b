//! One repository per entity kind.

mod comments;
mod config;
mod dependencies;
mod events;
mod issues;
mod labels;
mod plans;
mod workspaces;

pub use comments::CommentRepository;
pub use config::ConfigRepository;
pub use dependencies::DependencyRepository;
pub use events::{EventRepository, NewEvent, DEFAULT_LIST_LIMIT};
pub use issues::IssueRepository;
pub use labels::LabelRepository;
pub use plans::PlanRepository;
pub use workspaces::WorkspaceRepository;
