use std::sync::Arc;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

use super::connection::{SqlitePool, checkout, run_blocking};
use super::executor::{execute_on, query_on};

/// Handle to a validated `SQLite` statement.
///
/// Each pooled connection keeps the compiled statement in rusqlite's statement cache, so
/// re-running the handle does not re-parse the SQL on a warm connection.
#[derive(Clone)]
pub struct SqlitePreparedStatement {
    pool: SqlitePool,
    query: Arc<String>,
}

impl SqlitePreparedStatement {
    /// Compile `query` once to surface syntax errors up front.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the statement does not compile.
    pub async fn prepare(pool: &SqlitePool, query: &str) -> Result<Self, SqlHelperDbError> {
        let conn = checkout(pool).await?;
        let sql_owned = query.to_owned();
        run_blocking(Arc::clone(&*conn), move |guard| {
            guard.prepare_cached(&sql_owned)?;
            Ok(())
        })
        .await?;
        Ok(Self {
            pool: pool.clone(),
            query: Arc::new(query.to_owned()),
        })
    }

    /// Execute the statement as DML.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if checkout or execution fails.
    pub async fn execute(&self, params: &[RowValues]) -> Result<ExecSummary, SqlHelperDbError> {
        let conn = checkout(&self.pool).await?;
        execute_on(Arc::clone(&*conn), &self.query, params).await
    }

    /// Execute the statement as a query.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if checkout or execution fails.
    pub async fn query(&self, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        let conn = checkout(&self.pool).await?;
        query_on(Arc::clone(&*conn), &self.query, params).await
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        self.query.as_str()
    }
}

impl std::fmt::Debug for SqlitePreparedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePreparedStatement")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
