//! Route handlers and the router they are assembled into.

pub mod comments;
pub mod config;
pub mod dependencies;
pub mod events;
pub mod graph;
pub mod health;
pub mod issues;
pub mod labels;
pub mod plans;
pub mod workspaces;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the full `/api/v1` router over a shared [`AppState`].
pub fn router(state: AppState) -> Router {
    let workspace_routes = Router::new()
        .route("/", get(workspaces::list).post(workspaces::create))
        .route(
            "/:ws",
            get(workspaces::get).put(workspaces::update).delete(workspaces::delete),
        )
        .route("/:ws/stats", get(workspaces::stats))
        .route("/:ws/ready", get(graph::ready))
        .route("/:ws/blocked", get(graph::blocked))
        .route("/:ws/issues", get(issues::list).post(issues::create))
        .route(
            "/:ws/issues/:id",
            get(issues::get).put(issues::update).delete(issues::delete),
        )
        .route("/:ws/issues/:id/close", post(issues::close))
        .route("/:ws/issues/:id/reopen", post(issues::reopen))
        .route("/:ws/issues/:id/is-blocked", get(issues::is_blocked))
        .route("/:ws/issues/:id/deps", get(dependencies::graph).post(dependencies::add))
        .route("/:ws/issues/:id/deps/:target", delete(dependencies::remove))
        .route("/:ws/issues/:id/labels", post(labels::attach))
        .route("/:ws/issues/:id/labels/:name", delete(labels::detach))
        .route("/:ws/issues/:id/comments", get(comments::list).post(comments::create))
        .route(
            "/:ws/issues/:id/comments/:cid",
            get(comments::get).put(comments::update).delete(comments::delete),
        )
        .route("/:ws/issues/:id/events", get(events::list))
        .route("/:ws/issues/:id/plan", get(plans::context).post(plans::set_inline))
        .route("/:ws/issues/:id/plan/history", get(plans::history))
        .route("/:ws/labels", get(labels::list).post(labels::create))
        .route(
            "/:ws/labels/:name",
            get(labels::get).put(labels::update).delete(labels::delete),
        )
        .route("/:ws/plans", get(plans::list).post(plans::create))
        .route(
            "/:ws/plans/:id",
            get(plans::get).put(plans::update).delete(plans::delete),
        )
        .route("/:ws/plans/:id/link/:issue", post(plans::link).delete(plans::unlink))
        .route("/:ws/config", get(config::list))
        .route(
            "/:ws/config/:key",
            get(config::get).put(config::set).delete(config::delete),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/workspaces", workspace_routes)
        .with_state(state)
}
