use crate::error::SqlHelperDbError;
use crate::results::{CustomDbRow, FromRow, ResultSet};

/// Result of [`crate::DbClient::query_row`]: any failure is held until the row is scanned.
#[derive(Debug)]
pub struct SingleRow {
    outcome: Result<ResultSet, SqlHelperDbError>,
}

impl SingleRow {
    #[must_use]
    pub fn new(outcome: Result<ResultSet, SqlHelperDbError>) -> Self {
        Self { outcome }
    }

    /// Rewrite a deferred error, leaving a successful outcome untouched.
    #[must_use]
    pub fn map_err<F>(self, f: F) -> Self
    where
        F: FnOnce(SqlHelperDbError) -> SqlHelperDbError,
    {
        Self {
            outcome: self.outcome.map_err(f),
        }
    }

    #[must_use]
    pub fn is_err(&self) -> bool {
        self.outcome.is_err()
    }

    /// The first row, or the deferred error. An empty result is `NoRows`.
    ///
    /// # Errors
    /// Returns the deferred query error, or `SqlHelperDbError::NoRows`.
    pub fn scan(self) -> Result<CustomDbRow, SqlHelperDbError> {
        self.outcome?.into_first().ok_or(SqlHelperDbError::NoRows)
    }

    /// Scan into a destination type.
    ///
    /// # Errors
    /// As [`SingleRow::scan`], plus any conversion error from `T::from_row`.
    pub fn scan_as<T: FromRow>(self) -> Result<T, SqlHelperDbError> {
        T::from_row(&self.scan()?)
    }
}
