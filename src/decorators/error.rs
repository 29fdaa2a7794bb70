use async_trait::async_trait;

use crate::client::{DbClient, SingleRow};
use crate::error::SqlHelperDbError;
use crate::prepared::PreparedStatement;
use crate::results::{CustomDbRow, ResultSet};
use crate::transaction::{Transaction, TxOptions};
use crate::types::{ExecSummary, RowValues};

/// Tags every failure with `"{scope}::{operation}"`.
///
/// Successful results pass through untouched. The original error stays reachable through
/// [`SqlHelperDbError::root`], so `NoRows` checks and duplicate-key detection keep working
/// under any number of layers.
///
/// ```no_run
/// # use sql_helpers::prelude::*;
/// # async fn demo(client: Client) -> Result<(), SqlHelperDbError> {
/// let users = ErrorDecorator::new(&client, "users");
/// let err = users.get("SELECT * FROM users WHERE id = ?1", &[RowValues::Int(7)]).await;
/// // Err displays as "users::get: no rows in result set"
/// # let _ = err;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ErrorDecorator<C> {
    inner: C,
    scope: String,
}

impl<C: DbClient> ErrorDecorator<C> {
    pub fn new(inner: C, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn tag(
        &self,
        operation: &'static str,
    ) -> impl FnOnce(SqlHelperDbError) -> SqlHelperDbError + '_ {
        move |err| err.annotate(format!("{}::{operation}", self.scope))
    }
}

#[async_trait]
impl<C: DbClient> DbClient for ErrorDecorator<C> {
    async fn exec(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        self.inner.exec(query, params).await.map_err(self.tag("exec"))
    }

    async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
        self.inner.prepare(query).await.map_err(self.tag("prepare"))
    }

    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        self.inner.query(query, params).await.map_err(self.tag("query"))
    }

    async fn begin_transaction(
        &self,
        options: TxOptions,
    ) -> Result<Transaction, SqlHelperDbError> {
        self.inner
            .begin_transaction(options)
            .await
            .map_err(self.tag("begin_transaction"))
    }

    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
        self.inner.is_duplicate_key(err)
    }

    fn reports_insert_id(&self) -> bool {
        self.inner.reports_insert_id()
    }

    async fn query_row(&self, query: &str, params: &[RowValues]) -> SingleRow {
        let row = self.inner.query_row(query, params).await;
        row.map_err(self.tag("query_row"))
    }

    async fn select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<CustomDbRow>, SqlHelperDbError> {
        self.inner.select(query, params).await.map_err(self.tag("select"))
    }

    async fn get(&self, query: &str, params: &[RowValues]) -> Result<CustomDbRow, SqlHelperDbError> {
        self.inner.get(query, params).await.map_err(self.tag("get"))
    }

    async fn insert(&self, query: &str, params: &[RowValues]) -> Result<i64, SqlHelperDbError> {
        self.inner.insert(query, params).await.map_err(self.tag("insert"))
    }

    async fn insert_returning_id(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<i64, SqlHelperDbError> {
        self.inner
            .insert_returning_id(query, params)
            .await
            .map_err(self.tag("insert_returning_id"))
    }

    async fn insert_ignore(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<bool, SqlHelperDbError> {
        self.inner
            .insert_ignore(query, params)
            .await
            .map_err(self.tag("insert_ignore"))
    }

    async fn update(&self, query: &str, params: &[RowValues]) -> Result<u64, SqlHelperDbError> {
        self.inner.update(query, params).await.map_err(self.tag("update"))
    }

    async fn update_one(&self, query: &str, params: &[RowValues]) -> Result<(), SqlHelperDbError> {
        self.inner
            .update_one(query, params)
            .await
            .map_err(self.tag("update_one"))
    }

    async fn get_or_create(
        &self,
        select_query: &str,
        insert_query: &str,
        params: &[RowValues],
    ) -> Result<CustomDbRow, SqlHelperDbError> {
        self.inner
            .get_or_create(select_query, insert_query, params)
            .await
            .map_err(self.tag("get_or_create"))
    }
}
