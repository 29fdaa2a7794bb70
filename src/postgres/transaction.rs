use deadpool_postgres::{Object, Pool};

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::transaction::TxOptions;
use crate::types::{ExecSummary, RowValues};

use super::executor::{execute_on, query_on};

/// Transaction that owns a pooled Postgres client until commit or rollback.
///
/// Dropping an unfinished transaction issues `ROLLBACK` on a background task before the
/// client goes back to the pool.
pub struct PostgresTx {
    client: Option<Object>,
}

impl PostgresTx {
    /// Check a client out and send `BEGIN`.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if checkout or `BEGIN` fails.
    pub async fn begin(pool: &Pool, options: TxOptions) -> Result<Self, SqlHelperDbError> {
        let tx = Self {
            client: Some(pool.get().await?),
        };
        let begin = if options.read_only {
            "BEGIN READ ONLY"
        } else {
            "BEGIN"
        };
        tx.client()?.batch_execute(begin).await?;
        Ok(tx)
    }

    fn client(&self) -> Result<&Object, SqlHelperDbError> {
        self.client.as_ref().ok_or_else(|| {
            SqlHelperDbError::ExecutionError("Postgres transaction already completed".into())
        })
    }

    /// Execute DML inside the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the transaction is finished or execution fails.
    pub async fn execute(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        execute_on(self.client()?, query, params).await
    }

    /// Run a query inside the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the transaction is finished or execution fails.
    pub async fn query(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlHelperDbError> {
        query_on(self.client()?, query, params).await
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if `COMMIT` fails.
    pub async fn commit(mut self) -> Result<(), SqlHelperDbError> {
        self.client()?.batch_execute("COMMIT").await?;
        self.client = None;
        Ok(())
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if `ROLLBACK` fails.
    pub async fn rollback(mut self) -> Result<(), SqlHelperDbError> {
        self.client()?.batch_execute("ROLLBACK").await?;
        self.client = None;
        Ok(())
    }
}

impl Drop for PostgresTx {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            rt.spawn(async move {
                if let Err(e) = client.batch_execute("ROLLBACK").await {
                    tracing::warn!(error = %e, "postgres rollback on drop failed");
                }
            });
        } else {
            // no runtime to roll back on; keep the dirty client out of the pool
            drop(Object::take(client));
        }
    }
}
