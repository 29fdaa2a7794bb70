use crate::error::SqlHelperDbError;

use super::row::CustomDbRow;

/// Conversion from a fetched row into a caller-owned destination type.
///
/// ```rust
/// use sql_helpers::prelude::*;
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &CustomDbRow) -> Result<Self, SqlHelperDbError> {
///         let id = *row.try_get("id")?.as_int().ok_or_else(|| {
///             SqlHelperDbError::ExecutionError("id is not an integer".into())
///         })?;
///         let name = row.try_get("name")?.as_text().unwrap_or_default().to_string();
///         Ok(User { id, name })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Build `Self` from one row.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` when a column is missing or has the wrong type.
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlHelperDbError>;
}

impl FromRow for CustomDbRow {
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlHelperDbError> {
        Ok(row.clone())
    }
}
