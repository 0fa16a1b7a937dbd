//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing and handle both RFC 3339 and
//! `SQLite`'s `datetime('now')` timestamp formats.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::InvalidState(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a stored status, role, or action column.
///
/// An unrecognized value means the row was written by something other than
/// this crate, so it is refused instead of being coerced.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` naming the column and value.
pub fn parse_stored<T>(column: &str, s: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| DatabaseError::InvalidState(format!("{column}: {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column into a narrower unsigned type.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the stored value does not fit.
pub fn get_unsigned<T: TryFrom<i64>>(
    row: &libsql::Row,
    idx: i32,
    column: &str,
) -> Result<T, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    T::try_from(raw).map_err(|_| DatabaseError::InvalidState(format!("{column}: {raw} out of range")))
}

/// Fetch the single `id` produced by an `INSERT ... RETURNING id`.
///
/// # Errors
///
/// Returns `DatabaseError::NoResult` if the statement returned nothing.
pub async fn returning_id(mut rows: libsql::Rows) -> Result<i64, DatabaseError> {
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}
