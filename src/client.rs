//! The client contract shared by the core [`Client`] and every decorator.

mod core;
mod get_or_create;
mod single_row;

use std::sync::Arc;

use async_trait::async_trait;

pub use self::core::{Client, ClientOptions};
pub use get_or_create::get_or_create;
pub use single_row::SingleRow;

use crate::error::SqlHelperDbError;
use crate::prepared::PreparedStatement;
use crate::results::{CustomDbRow, FromRow, ResultSet};
use crate::transaction::{Transaction, TxOptions};
use crate::types::{ExecSummary, RowValues};

/// Database operations implemented identically by [`Client`], [`crate::ErrorDecorator`] and
/// [`crate::LoggingDecorator`].
///
/// Only the raw primitives are required. The helpers have default implementations built on
/// them; decorators override every method so each helper call is one annotated or logged
/// operation.
#[async_trait]
pub trait DbClient: Send + Sync {
    /// Execute a statement and report rows affected and any generated identity.
    async fn exec(&self, query: &str, params: &[RowValues])
    -> Result<ExecSummary, SqlHelperDbError>;

    /// Compile a statement for repeated execution.
    async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError>;

    /// Run a query and materialize its rows.
    async fn query(&self, query: &str, params: &[RowValues])
    -> Result<ResultSet, SqlHelperDbError>;

    /// Begin a transaction on a dedicated connection.
    async fn begin_transaction(&self, options: TxOptions)
    -> Result<Transaction, SqlHelperDbError>;

    /// Whether `err` is this store's duplicate unique-key violation.
    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool;

    /// Whether [`DbClient::exec`] reports the identity generated by an insert.
    fn reports_insert_id(&self) -> bool {
        true
    }

    /// Run a query expected to yield one row; errors surface from [`SingleRow::scan`].
    async fn query_row(&self, query: &str, params: &[RowValues]) -> SingleRow {
        SingleRow::new(self.query(query, params).await)
    }

    /// Fetch every row.
    async fn select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<CustomDbRow>, SqlHelperDbError> {
        Ok(self.query(query, params).await?.results)
    }

    /// Fetch one row; zero rows is [`SqlHelperDbError::NoRows`]. Extra rows are ignored.
    async fn get(&self, query: &str, params: &[RowValues])
    -> Result<CustomDbRow, SqlHelperDbError> {
        self.query(query, params)
            .await?
            .into_first()
            .ok_or(SqlHelperDbError::NoRows)
    }

    /// Execute an insert and return the driver's last-insert-id.
    ///
    /// Fails with [`SqlHelperDbError::IdentityRetrieval`] when the statement wrote no row, or
    /// when the dialect reports no identity (Postgres); use [`DbClient::insert_returning_id`]
    /// there.
    async fn insert(&self, query: &str, params: &[RowValues]) -> Result<i64, SqlHelperDbError> {
        self.exec(query, params).await?.last_insert_id()
    }

    /// Run an `INSERT ... RETURNING id` and read the single identity column.
    ///
    /// Multi-column `RETURNING` clauses are not supported.
    async fn insert_returning_id(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<i64, SqlHelperDbError> {
        let row = self.query_row(query, params).await.scan()?;
        scan_identity(&row)
    }

    /// Execute an `INSERT ... ON CONFLICT DO NOTHING` style statement; `false` means nothing
    /// was written.
    async fn insert_ignore(&self, query: &str, params: &[RowValues])
    -> Result<bool, SqlHelperDbError> {
        Ok(self.exec(query, params).await?.rows_affected != 0)
    }

    /// Execute and return the affected-row count.
    async fn update(&self, query: &str, params: &[RowValues]) -> Result<u64, SqlHelperDbError> {
        Ok(self.exec(query, params).await?.rows_affected)
    }

    /// Execute and require exactly one affected row.
    async fn update_one(&self, query: &str, params: &[RowValues])
    -> Result<(), SqlHelperDbError> {
        let affected = self.exec(query, params).await?.rows_affected;
        if affected == 1 {
            Ok(())
        } else {
            Err(SqlHelperDbError::UnexpectedRowCount { affected })
        }
    }

    /// Fetch the row keyed by `params[0]`, inserting it with the full `params` first if
    /// absent. See [`get_or_create`] for the race handling.
    async fn get_or_create(
        &self,
        select_query: &str,
        insert_query: &str,
        params: &[RowValues],
    ) -> Result<CustomDbRow, SqlHelperDbError> {
        get_or_create(self, select_query, insert_query, params).await
    }
}

/// Read the identity out of a one-column `RETURNING` row.
pub(crate) fn scan_identity(row: &CustomDbRow) -> Result<i64, SqlHelperDbError> {
    if row.rows.len() != 1 {
        return Err(SqlHelperDbError::ExecutionError(format!(
            "insert_returning_id expects exactly one returned column, got {}",
            row.rows.len()
        )));
    }
    match row.get_by_index(0) {
        Some(RowValues::Int(id)) => Ok(*id),
        other => Err(SqlHelperDbError::IdentityRetrieval(format!(
            "returned identity is not an integer: {other:?}"
        ))),
    }
}

macro_rules! forward_db_client {
    ($(<$($generic:tt),+> $wrapper:ty),+ $(,)?) => {$(
        #[async_trait]
        impl<$($generic),+> DbClient for $wrapper
        where
            T: DbClient + ?Sized,
        {
            async fn exec(&self, query: &str, params: &[RowValues])
            -> Result<ExecSummary, SqlHelperDbError> {
                (**self).exec(query, params).await
            }

            async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
                (**self).prepare(query).await
            }

            async fn query(&self, query: &str, params: &[RowValues])
            -> Result<ResultSet, SqlHelperDbError> {
                (**self).query(query, params).await
            }

            async fn begin_transaction(&self, options: TxOptions)
            -> Result<Transaction, SqlHelperDbError> {
                (**self).begin_transaction(options).await
            }

            fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
                (**self).is_duplicate_key(err)
            }

            fn reports_insert_id(&self) -> bool {
                (**self).reports_insert_id()
            }

            async fn query_row(&self, query: &str, params: &[RowValues]) -> SingleRow {
                (**self).query_row(query, params).await
            }

            async fn select(&self, query: &str, params: &[RowValues])
            -> Result<Vec<CustomDbRow>, SqlHelperDbError> {
                (**self).select(query, params).await
            }

            async fn get(&self, query: &str, params: &[RowValues])
            -> Result<CustomDbRow, SqlHelperDbError> {
                (**self).get(query, params).await
            }

            async fn insert(&self, query: &str, params: &[RowValues])
            -> Result<i64, SqlHelperDbError> {
                (**self).insert(query, params).await
            }

            async fn insert_returning_id(&self, query: &str, params: &[RowValues])
            -> Result<i64, SqlHelperDbError> {
                (**self).insert_returning_id(query, params).await
            }

            async fn insert_ignore(&self, query: &str, params: &[RowValues])
            -> Result<bool, SqlHelperDbError> {
                (**self).insert_ignore(query, params).await
            }

            async fn update(&self, query: &str, params: &[RowValues])
            -> Result<u64, SqlHelperDbError> {
                (**self).update(query, params).await
            }

            async fn update_one(&self, query: &str, params: &[RowValues])
            -> Result<(), SqlHelperDbError> {
                (**self).update_one(query, params).await
            }

            async fn get_or_create(
                &self,
                select_query: &str,
                insert_query: &str,
                params: &[RowValues],
            ) -> Result<CustomDbRow, SqlHelperDbError> {
                (**self).get_or_create(select_query, insert_query, params).await
            }
        }
    )+};
}

forward_db_client!(<'a, T> &'a T, <T> Arc<T>, <T> Box<T>);

/// Typed conveniences over any [`DbClient`], converting rows with [`FromRow`].
#[async_trait]
pub trait DbClientExt: DbClient {
    /// [`DbClient::get`] into a destination type.
    async fn get_as<T: FromRow + Send>(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<T, SqlHelperDbError> {
        T::from_row(&self.get(query, params).await?)
    }

    /// [`DbClient::select`] into a collection of destination values.
    async fn select_as<T: FromRow + Send>(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<T>, SqlHelperDbError> {
        self.select(query, params)
            .await?
            .iter()
            .map(T::from_row)
            .collect()
    }

    /// [`DbClient::get_or_create`] into a destination type.
    async fn get_or_create_as<T: FromRow + Send>(
        &self,
        select_query: &str,
        insert_query: &str,
        params: &[RowValues],
    ) -> Result<T, SqlHelperDbError> {
        T::from_row(
            &self
                .get_or_create(select_query, insert_query, params)
                .await?,
        )
    }
}

impl<C: DbClient + ?Sized> DbClientExt for C {}
