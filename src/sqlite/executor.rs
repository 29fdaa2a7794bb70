use std::sync::Arc;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

use super::connection::{SharedSqliteConnection, SqlitePool, checkout, run_blocking};
use super::params::Params;
use super::query::build_result_set;

/// Execute one statement and report rows affected plus `last_insert_rowid`.
///
/// No identity is reported when the statement wrote nothing.
///
/// # Errors
/// Returns `SqlHelperDbError` if checkout, preparation or execution fails.
pub async fn execute(
    pool: &SqlitePool,
    query: &str,
    params: &[RowValues],
) -> Result<ExecSummary, SqlHelperDbError> {
    let conn = checkout(pool).await?;
    execute_on(Arc::clone(&*conn), query, params).await
}

/// Run a query and materialize its rows.
///
/// # Errors
/// Returns `SqlHelperDbError` if checkout, preparation or execution fails.
pub async fn query(
    pool: &SqlitePool,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHelperDbError> {
    let conn = checkout(pool).await?;
    query_on(Arc::clone(&*conn), query, params).await
}

/// Check a connection out and round-trip `SELECT 1`.
///
/// # Errors
/// Returns `SqlHelperDbError` if the database cannot be reached.
pub async fn ping(pool: &SqlitePool) -> Result<(), SqlHelperDbError> {
    let conn = checkout(pool).await?;
    run_blocking(Arc::clone(&*conn), |guard| {
        guard.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    })
    .await
}

pub(crate) async fn execute_on(
    conn: SharedSqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<ExecSummary, SqlHelperDbError> {
    let sql_owned = query.to_owned();
    let params_owned = Params::convert(params);
    run_blocking(conn, move |guard| {
        let mut stmt = guard.prepare_cached(&sql_owned)?;
        let affected = stmt.execute(&params_owned.as_refs()[..])?;
        drop(stmt);
        let rows_affected = u64::try_from(affected).map_err(|e| {
            SqlHelperDbError::ExecutionError(format!("sqlite affected rows conversion error: {e}"))
        })?;
        Ok(ExecSummary {
            rows_affected,
            // last_insert_rowid is connection-wide and stale when nothing was written
            last_insert_id: (rows_affected > 0).then(|| guard.last_insert_rowid()),
        })
    })
    .await
}

pub(crate) async fn query_on(
    conn: SharedSqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHelperDbError> {
    let sql_owned = query.to_owned();
    let params_owned = Params::convert(params);
    run_blocking(conn, move |guard| {
        let mut stmt = guard.prepare_cached(&sql_owned)?;
        build_result_set(&mut stmt, &params_owned.0)
    })
    .await
}
