use std::sync::Arc;

use bb8::PooledConnection;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::transaction::{TxBehavior, TxOptions};
use crate::types::{ExecSummary, RowValues};

use super::connection::{SqliteManager, SqlitePool, checkout, run_blocking};
use super::executor::{execute_on, query_on};

/// Transaction handle that owns a pooled `SQLite` connection until completion.
///
/// Dropping an unfinished transaction rolls it back before the connection returns to the pool.
pub struct SqliteTx {
    conn: Option<PooledConnection<'static, SqliteManager>>,
}

fn begin_sql(options: &TxOptions) -> &'static str {
    match options.behavior {
        TxBehavior::Deferred => "BEGIN DEFERRED",
        TxBehavior::Immediate => "BEGIN IMMEDIATE",
        TxBehavior::Exclusive => "BEGIN EXCLUSIVE",
    }
}

impl SqliteTx {
    /// Check out a connection and open a transaction on it.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if checkout or `BEGIN` fails.
    pub async fn begin(pool: &SqlitePool, options: TxOptions) -> Result<Self, SqlHelperDbError> {
        // owned by the handle before BEGIN runs, so a cancelled begin still rolls back on drop
        let tx = Self {
            conn: Some(checkout(pool).await?),
        };
        let sql = begin_sql(&options);
        run_blocking(tx.handle()?, move |guard| {
            guard.execute_batch(sql)?;
            if options.read_only {
                guard.pragma_update(None, "query_only", true)?;
            }
            Ok(())
        })
        .await?;
        Ok(tx)
    }

    fn handle(&self) -> Result<super::SharedSqliteConnection, SqlHelperDbError> {
        self.conn
            .as_ref()
            .map(|c| Arc::clone(&**c))
            .ok_or_else(|| {
                SqlHelperDbError::ExecutionError("SQLite transaction already completed".into())
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
        execute_on(self.handle()?, query, params).await
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
        query_on(self.handle()?, query, params).await
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if `COMMIT` fails; the transaction is rolled back on drop.
    pub async fn commit(mut self) -> Result<(), SqlHelperDbError> {
        self.finish("COMMIT").await
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if `ROLLBACK` fails.
    pub async fn rollback(mut self) -> Result<(), SqlHelperDbError> {
        self.finish("ROLLBACK").await
    }

    async fn finish(&mut self, sql: &'static str) -> Result<(), SqlHelperDbError> {
        let handle = self.handle()?;
        run_blocking(handle, move |guard| {
            guard.execute_batch(sql)?;
            guard.pragma_update(None, "query_only", false)?;
            Ok(())
        })
        .await?;
        self.conn = None;
        Ok(())
    }
}

fn rollback_blocking(conn: &mut rusqlite::Connection) {
    if !conn.is_autocommit() {
        if let Err(e) = conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %e, "sqlite rollback on drop failed");
        }
    }
    if let Err(e) = conn.pragma_update(None, "query_only", false) {
        tracing::warn!(error = %e, "sqlite query_only reset on drop failed");
    }
}

impl Drop for SqliteTx {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let handle = Arc::clone(&*conn);
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                // the pooled connection goes back only after the rollback ran
                rt.spawn_blocking(move || {
                    rollback_blocking(&mut handle.blocking_lock());
                    drop(conn);
                });
            }
            Err(_) => {
                if let Ok(mut guard) = handle.try_lock() {
                    rollback_blocking(&mut guard);
                }
                drop(conn);
            }
        }
    }
}
