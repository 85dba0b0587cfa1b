//! Shared application state and the `X-Actor` header extractor.

use std::sync::Arc;

use arc_service::{
    CommentService, ConfigService, DependencyService, EventService, IssueService, LabelService, PlanService,
    WorkspaceService,
};
use arc_storage::StorageEngine;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::config::ServerConfig;

/// The services every handler shares, built once at startup over the single
/// storage engine.
#[derive(Clone)]
pub struct AppState {
    /// The storage engine, for the health check which bypasses every
    /// service.
    pub engine: Arc<StorageEngine>,
    /// Configuration the server was started with (e.g. the default sort
    /// policy for `GET /ready`).
    pub config: Arc<ServerConfig>,
    pub workspaces: Arc<WorkspaceService>,
    pub issues: Arc<IssueService>,
    pub dependencies: Arc<DependencyService>,
    pub labels: Arc<LabelService>,
    pub comments: Arc<CommentService>,
    pub plans: Arc<PlanService>,
    pub events: Arc<EventService>,
    /// The workspace key/value settings service (distinct from `config`
    /// above, which is this server process's own bootstrap configuration).
    pub workspace_config: Arc<ConfigService>,
}

impl AppState {
    /// Build every service over a shared storage engine handle.
    pub fn new(engine: Arc<StorageEngine>, config: ServerConfig) -> Self {
        Self {
            workspaces: Arc::new(WorkspaceService::new(engine.clone())),
            issues: Arc::new(IssueService::new(engine.clone())),
            dependencies: Arc::new(DependencyService::new(engine.clone())),
            labels: Arc::new(LabelService::new(engine.clone())),
            comments: Arc::new(CommentService::new(engine.clone())),
            plans: Arc::new(PlanService::new(engine.clone())),
            events: Arc::new(EventService::new(engine.clone())),
            workspace_config: Arc::new(ConfigService::new(engine.clone())),
            engine,
            config: Arc::new(config),
        }
    }
}

/// The caller identity from `X-Actor`, defaulting to `"cli"` when absent.
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("X-Actor")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .unwrap_or("cli")
            .to_string();
        Ok(Actor(actor))
    }
}
