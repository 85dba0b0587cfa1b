//! Error types for the Arc issue graph engine.
//!
//! Every fallible operation in `arc-storage`, `arc-graph`, and `arc-service`
//! returns [`Result<T>`], whose error variants correspond one-to-one with the
//! five error kinds described by the HTTP API's status-code table: a
//! [`ValidationError`] maps to 400, [`NotFoundError`] to 404, [`ConflictError`]
//! to 409, [`StorageError`] to 500, and [`TimeoutError`] to 504. `arc-server`
//! is the only crate that knows about HTTP status codes; it matches on
//! [`Error`] to build the response.

use thiserror::Error;

/// The error type for Arc operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input: missing required fields, out-of-range priority,
    /// invalid enum value, self-dependency, empty comment text, bounds
    /// exceeded. Never retried by the server.
    #[error("{reason}")]
    Validation {
        /// The field or argument that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Reference to a workspace, issue, plan, label, or comment that does
    /// not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up (e.g. `"issue"`).
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A unique-constraint violation, such as a workspace name already in
    /// use.
    #[error("{0}")]
    Conflict(String),

    /// An I/O failure, transaction rollback, or schema error. The offending
    /// transaction is aborted; no audit event is recorded for it.
    #[error("storage error: {0}")]
    Storage(String),

    /// The caller-supplied request deadline elapsed during I/O.
    #[error("request deadline exceeded")]
    Timeout,
}

impl Error {
    /// Build a [`Error::Validation`] for a named field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Build a [`Error::NotFound`] for a named entity kind.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// A specialized `Result` type for Arc operations.
pub type Result<T> = std::result::Result<T, Error>;
