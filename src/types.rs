use std::fmt;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlHelperDbError;

/// Values that can be stored in a database row or used as query parameters.
///
/// The same enum is used for every backend so helper code never branches on driver types:
/// ```rust
/// use sql_helpers::prelude::*;
///
/// let params = vec![
///     RowValues::Text("alice".into()),
///     RowValues::Int(42),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

/// The database type behind a [`crate::ConfigAndPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `PostgreSQL` database
    #[cfg(feature = "postgres")]
    Postgres,
    /// `SQLite` database
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl DatabaseType {
    /// Whether the driver exposes the identity generated by an insert.
    #[must_use]
    pub fn reports_last_insert_id(self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => false,
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => true,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => f.write_str("postgres"),
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Outcome of an exec-style statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecSummary {
    /// Number of rows the statement modified
    pub rows_affected: u64,
    /// Identity generated by the statement, when the dialect reports one and a row was written
    pub last_insert_id: Option<i64>,
}

impl ExecSummary {
    /// The generated identity, or `IdentityRetrieval` when the dialect has none.
    ///
    /// # Errors
    /// Returns [`SqlHelperDbError::IdentityRetrieval`] when no identity was reported.
    pub fn last_insert_id(&self) -> Result<i64, SqlHelperDbError> {
        self.last_insert_id.ok_or_else(|| {
            SqlHelperDbError::IdentityRetrieval(
                "no identity reported; the statement wrote nothing or the driver has none"
                    .to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_reads_from_integer_flags() {
        assert_eq!(RowValues::Int(1).as_bool(), Some(&true));
        assert_eq!(RowValues::Int(0).as_bool(), Some(&false));
        assert_eq!(RowValues::Int(7).as_bool(), None);
    }

    #[test]
    fn timestamp_parses_sqlite_text() {
        let parsed = RowValues::Text("2024-03-01 10:11:12.250".into()).as_timestamp();
        assert!(parsed.is_some());
    }

    #[test]
    fn missing_insert_id_is_identity_error() {
        let summary = ExecSummary {
            rows_affected: 1,
            last_insert_id: None,
        };
        assert!(matches!(
            summary.last_insert_id(),
            Err(SqlHelperDbError::IdentityRetrieval(_))
        ));
    }
}
