#[cfg(feature = "postgres")]
use crate::postgres::PostgresPreparedStatement;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqlitePreparedStatement;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

/// A statement compiled once and executed many times.
#[derive(Debug)]
pub enum PreparedStatement {
    #[cfg(feature = "postgres")]
    Postgres(PostgresPreparedStatement),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePreparedStatement),
}

impl PreparedStatement {
    /// Execute the statement as DML.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if execution fails.
    pub async fn execute(&self, params: &[RowValues]) -> Result<ExecSummary, SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            PreparedStatement::Postgres(stmt) => stmt.execute(params).await,
            #[cfg(feature = "sqlite")]
            PreparedStatement::Sqlite(stmt) => stmt.execute(params).await,
        }
    }

    /// Execute the statement as a query.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if execution fails.
    pub async fn query(&self, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            PreparedStatement::Postgres(stmt) => stmt.query(params).await,
            #[cfg(feature = "sqlite")]
            PreparedStatement::Sqlite(stmt) => stmt.query(params).await,
        }
    }

    /// The SQL text the statement was prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        match self {
            #[cfg(feature = "postgres")]
            PreparedStatement::Postgres(stmt) => stmt.sql(),
            #[cfg(feature = "sqlite")]
            PreparedStatement::Sqlite(stmt) => stmt.sql(),
        }
    }
}
