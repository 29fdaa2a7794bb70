use deadpool_postgres::{Object, Pool};
use tokio_postgres::Statement;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

use super::params::Params;
use super::query::build_result_set_from_rows;

/// Prepared statement pinned to the pooled client it was prepared on.
///
/// The client stays checked out for as long as the handle lives.
pub struct PostgresPreparedStatement {
    client: Object,
    stmt: Statement,
    query: String,
}

impl PostgresPreparedStatement {
    /// Check a client out and prepare `query` on it.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if checkout or preparation fails.
    pub async fn prepare(pool: &Pool, query: &str) -> Result<Self, SqlHelperDbError> {
        let client = pool.get().await?;
        let stmt = client.prepare_cached(query).await?;
        Ok(Self {
            client,
            stmt,
            query: query.to_owned(),
        })
    }

    /// Execute the statement as DML.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if execution fails.
    pub async fn execute(&self, params: &[RowValues]) -> Result<ExecSummary, SqlHelperDbError> {
        let converted = Params::convert(params);
        let rows_affected = self.client.execute(&self.stmt, converted.as_refs()).await?;
        Ok(ExecSummary {
            rows_affected,
            last_insert_id: None,
        })
    }

    /// Execute the statement as a query.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if execution fails.
    pub async fn query(&self, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        let converted = Params::convert(params);
        let rows = self.client.query(&self.stmt, converted.as_refs()).await?;
        build_result_set_from_rows(self.stmt.columns(), &rows)
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.query
    }
}

impl std::fmt::Debug for PostgresPreparedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresPreparedStatement")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
