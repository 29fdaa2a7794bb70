#[cfg(feature = "postgres")]
use crate::postgres::PostgresTx;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteTx;

use crate::error::SqlHelperDbError;
use crate::results::ResultSet;
use crate::types::{ExecSummary, RowValues};

/// How `SQLite` acquires its locks when the transaction begins. Ignored by Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxBehavior {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

/// Options passed to [`crate::DbClient::begin_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub behavior: TxBehavior,
    pub read_only: bool,
}

impl TxOptions {
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn immediate() -> Self {
        Self {
            behavior: TxBehavior::Immediate,
            ..Self::default()
        }
    }
}

/// An open transaction. Uncommitted transactions roll back when dropped.
pub enum Transaction {
    #[cfg(feature = "postgres")]
    Postgres(PostgresTx),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteTx),
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => f.write_str("Transaction::Postgres"),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.write_str("Transaction::Sqlite"),
        }
    }
}

impl Transaction {
    /// Execute a statement inside the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the statement fails or the transaction is finished.
    pub async fn exec(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            Transaction::Postgres(tx) => tx.execute(query, params).await,
            #[cfg(feature = "sqlite")]
            Transaction::Sqlite(tx) => tx.execute(query, params).await,
        }
    }

    /// Run a query inside the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the query fails or the transaction is finished.
    pub async fn query(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            Transaction::Postgres(tx) => tx.query(query, params).await,
            #[cfg(feature = "sqlite")]
            Transaction::Sqlite(tx) => tx.query(query, params).await,
        }
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the commit fails.
    pub async fn commit(self) -> Result<(), SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            Transaction::Postgres(tx) => tx.commit().await,
            #[cfg(feature = "sqlite")]
            Transaction::Sqlite(tx) => tx.commit().await,
        }
    }

    /// Roll the transaction back.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the rollback fails.
    pub async fn rollback(self) -> Result<(), SqlHelperDbError> {
        match self {
            #[cfg(feature = "postgres")]
            Transaction::Postgres(tx) => tx.rollback().await,
            #[cfg(feature = "sqlite")]
            Transaction::Sqlite(tx) => tx.rollback().await,
        }
    }
}
