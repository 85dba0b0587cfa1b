//! Conversion from `rusqlite` failures into the shared domain error type.
//!
//! `arc-core` stays free of any dependency on `rusqlite`, so the conversion
//! lives here instead of as a `From` impl on `arc_core::Error` (which would
//! violate the orphan rule anyway, since neither type is local to that
//! crate). Repository code calls `.storage_err()` wherever it would
//! otherwise use `?` directly on a `rusqlite::Result`.

use arc_core::Error;
use rusqlite::ErrorCode;

/// Extension trait converting a `rusqlite::Result` into `arc_core::Result`.
pub trait SqliteResultExt<T> {
    /// Map a `rusqlite` failure onto the appropriate `arc_core::Error`
    /// variant, promoting known unique-constraint violations to a generic
    /// [`Error::Conflict`] instead of the generic [`Error::Storage`].
    fn storage_err(self) -> arc_core::Result<T>;

    /// Like [`Self::storage_err`], but a constraint violation is reported as
    /// `"{entity} already exists"` instead of a generic message — for call
    /// sites that know which entity they were inserting.
    fn storage_err_as(self, entity: &str) -> arc_core::Result<T>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn storage_err(self) -> arc_core::Result<T> {
        self.map_err(|err| map_sqlite_error(err, "record already exists"))
    }

    fn storage_err_as(self, entity: &str) -> arc_core::Result<T> {
        self.map_err(|err| map_sqlite_error(err, &format!("{entity} already exists")))
    }
}

/// Map a `rusqlite` failure onto `arc_core::Error`, never forwarding
/// SQLite's own constraint-violation text (which names raw table/column
/// identifiers) to the caller.
fn map_sqlite_error(err: rusqlite::Error, conflict_message: &str) -> Error {
    if let rusqlite::Error::SqliteFailure(sqlite_err, _) = err {
        if sqlite_err.code == ErrorCode::ConstraintViolation {
            return Error::Conflict(conflict_message.to_string());
        }
    }
    Error::Storage(err.to_string())
}
