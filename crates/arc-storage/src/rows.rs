//! Shared row-conversion helpers.
//!
//! Timestamps are stored as RFC 3339 text; every repository's `row_to_*`
//! function goes through [`parse_timestamp`] rather than repeating the
//! parse-or-corrupt-db handling inline.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;

/// Parse an RFC 3339 timestamp column, reporting a conversion failure (not a
/// panic) if the stored value is not well-formed — a sign of external
/// tampering or a bug elsewhere in this crate, not a case to silently
/// default around.
pub(crate) fn parse_timestamp(col: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqlError::FromSqlConversionFailure(col, Type::Text, Box::new(e)))
}

/// Parse an optional RFC 3339 timestamp column.
pub(crate) fn parse_timestamp_opt(
    col: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(col, &s)).transpose()
}

/// Parse a closed-enum column via its `FromStr` impl, reporting a
/// conversion failure if the stored value is not one of the known variants.
pub(crate) fn parse_enum<T: std::str::FromStr<Err = String>>(
    col: usize,
    raw: &str,
) -> rusqlite::Result<T> {
    raw.parse()
        .map_err(|e: String| SqlError::FromSqlConversionFailure(col, Type::Text, e.into()))
}
