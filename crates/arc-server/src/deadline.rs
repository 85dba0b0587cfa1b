//! `X-Deadline-Ms` client-deadline propagation: a request carrying this
//! header aborts with [`arc_core::Error::Timeout`] (504) if its handler has
//! not finished within that many milliseconds.
//!
//! This sits inside `tower_http::trace::TraceLayer` so a timed-out request
//! still gets a trace span, and outside the per-handler transaction
//! boundary — the deadline bounds a whole request, not a single statement.

use std::time::Duration;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Enforce the caller-supplied `X-Deadline-Ms` header, if present.
pub async fn enforce_deadline(req: Request, next: Next) -> Response {
    let deadline_ms = req
        .headers()
        .get("x-deadline-ms")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    match deadline_ms {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), next.run(req)).await {
            Ok(response) => response,
            Err(_elapsed) => ApiError(arc_core::Error::Timeout).into_response(),
        },
        None => next.run(req).await,
    }
}
