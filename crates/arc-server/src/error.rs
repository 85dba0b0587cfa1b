//! Maps [`arc_core::Error`] to an HTTP response: one match arm per domain
//! error variant, translating it straight to a status code and JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// The `{"error": "<message>"}` envelope returned for every non-2xx
/// response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Newtype so `arc_core::Error` (defined in a crate this one doesn't own)
/// can implement axum's `IntoResponse`.
pub struct ApiError(pub arc_core::Error);

impl From<arc_core::Error> for ApiError {
    fn from(err: arc_core::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            arc_core::Error::Validation { .. } => StatusCode::BAD_REQUEST,
            arc_core::Error::NotFound { .. } => StatusCode::NOT_FOUND,
            arc_core::Error::Conflict(_) => StatusCode::CONFLICT,
            arc_core::Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            arc_core::Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

/// The result type every handler in this crate returns.
pub type ApiResult<T> = Result<T, ApiError>;
