//! The HTTP API binary crate for the Arc issue graph engine.
//!
//! This crate is a thin translator: it parses requests, dispatches to
//! `arc-service` operations (or, for the read-only graph queries, straight
//! to `arc-graph`), and encodes the result or error. It owns nothing the
//! other crates don't already define.

pub mod config;
pub mod deadline;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use arc_storage::StorageEngine;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use state::AppState;

/// How long in-flight handlers get to finish once shutdown begins.
pub const GRACEFUL_SHUTDOWN_SECS: u64 = 10;

/// Open the storage engine (running migrations) and build the `/api/v1`
/// router over it.
pub fn build(config: ServerConfig) -> arc_core::Result<Router> {
    let engine = Arc::new(StorageEngine::open(&config.data_dir)?);
    let state = AppState::new(engine, config);
    Ok(Router::new()
        .nest("/api/v1", routes::router(state))
        .layer(axum::middleware::from_fn(deadline::enforce_deadline))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30))))
}

/// Serve `router` on `bind_addr` until a shutdown signal arrives, then wait
/// up to [`GRACEFUL_SHUTDOWN_SECS`] for in-flight handlers to drain.
pub async fn serve(router: Router, bind_addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "arc-server listening");

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel();
    let serving = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });

    let grace_period_elapsed = async move {
        if signalled_rx.await.is_ok() {
            tokio::time::sleep(Duration::from_secs(GRACEFUL_SHUTDOWN_SECS)).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = serving => result,
        () = grace_period_elapsed => {
            tracing::warn!("graceful shutdown window elapsed with requests still in flight");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
