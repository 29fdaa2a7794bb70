use deadpool_postgres::{Object, Pool};

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

use super::params::Params;
use super::query::build_result_set_from_rows;

/// Execute one statement. Postgres reports no last-insert-id; use `RETURNING` instead.
///
/// # Errors
/// Returns `SqlHelperDbError` if checkout, preparation or execution fails.
pub async fn execute(
    pool: &Pool,
    query: &str,
    params: &[RowValues],
) -> Result<ExecSummary, SqlHelperDbError> {
    let client = pool.get().await?;
    execute_on(&client, query, params).await
}

/// Run a query and materialize its rows.
///
/// # Errors
/// Returns `SqlHelperDbError` if checkout, preparation or execution fails.
pub async fn query(
    pool: &Pool,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHelperDbError> {
    let client = pool.get().await?;
    query_on(&client, query, params).await
}

/// Check a client out and round-trip `SELECT 1`.
///
/// # Errors
/// Returns `SqlHelperDbError` if the server cannot be reached.
pub async fn ping(pool: &Pool) -> Result<(), SqlHelperDbError> {
    let client = pool.get().await?;
    client.simple_query("SELECT 1").await?;
    Ok(())
}

pub(crate) async fn execute_on(
    client: &Object,
    query: &str,
    params: &[RowValues],
) -> Result<ExecSummary, SqlHelperDbError> {
    let stmt = client.prepare_cached(query).await?;
    let converted = Params::convert(params);
    let rows_affected = client.execute(&stmt, converted.as_refs()).await?;
    Ok(ExecSummary {
        rows_affected,
        last_insert_id: None,
    })
}

pub(crate) async fn query_on(
    client: &Object,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHelperDbError> {
    let stmt = client.prepare_cached(query).await?;
    let converted = Params::convert(params);
    let rows = client.query(&stmt, converted.as_refs()).await?;
    build_result_set_from_rows(stmt.columns(), &rows)
}
