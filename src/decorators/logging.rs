use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::client::{DbClient, SingleRow};
use crate::error::SqlHelperDbError;
use crate::prepared::PreparedStatement;
use crate::results::{CustomDbRow, ResultSet};
use crate::transaction::{Transaction, TxOptions};
use crate::types::{ExecSummary, RowValues};

/// Tracing target used by [`TracingSink`].
pub const QUERY_LOG_TARGET: &str = "sql_helpers::query";

/// Collapse every whitespace run to one space and trim both ends.
#[must_use]
pub fn normalize_whitespace(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One finished or abandoned call, as handed to a [`QueryLogSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLogEntry {
    pub elapsed: Duration,
    /// Whitespace-normalized SQL.
    pub query: String,
    /// `None` for calls that carry no arguments (`prepare`, `begin_transaction`).
    pub params: Option<Vec<RowValues>>,
    pub succeeded: bool,
    /// The caller dropped the future before the wrapped call finished.
    pub cancelled: bool,
}

impl fmt::Display for QueryLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.elapsed, self.query)?;
        if let Some(params) = &self.params {
            write!(f, ": {params:?}")?;
        }
        Ok(())
    }
}

/// Destination for [`LoggingDecorator`] lines.
pub trait QueryLogSink: Send + Sync {
    fn record(&self, entry: &QueryLogEntry);
}

/// Emits each entry as a `tracing` event on [`QUERY_LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl QueryLogSink for TracingSink {
    fn record(&self, entry: &QueryLogEntry) {
        let outcome = match (entry.cancelled, entry.succeeded) {
            (true, _) => "cancelled",
            (false, true) => "ok",
            (false, false) => "error",
        };
        tracing::info!(target: QUERY_LOG_TARGET, outcome, "{entry}");
    }
}

/// Keeps rendered lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return every captured line.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl QueryLogSink for MemorySink {
    fn record(&self, entry: &QueryLogEntry) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.to_string());
    }
}

/// Writes one line per call: `"{elapsed}: {query}: {params}"`.
///
/// Lines are written when the wrapped call finishes, whether it failed or not, and also when
/// the caller drops the future first (a timeout, a lost `select!` branch); such lines carry
/// `cancelled`. The result is returned unchanged.
#[derive(Clone)]
pub struct LoggingDecorator<C> {
    inner: C,
    sink: Arc<dyn QueryLogSink>,
}

impl<C: DbClient> LoggingDecorator<C> {
    pub fn new(inner: C, sink: Arc<dyn QueryLogSink>) -> Self {
        Self { inner, sink }
    }

    /// Log through `tracing` on [`QUERY_LOG_TARGET`].
    pub fn with_tracing(inner: C) -> Self {
        Self::new(inner, Arc::new(TracingSink))
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn line<'a>(&'a self, query: String, params: Option<&'a [RowValues]>) -> PendingLine<'a> {
        PendingLine {
            sink: self.sink.as_ref(),
            started: Instant::now(),
            query,
            params,
            succeeded: None,
        }
    }

    fn call<'a>(&'a self, query: &str, params: &'a [RowValues]) -> PendingLine<'a> {
        self.line(normalize_whitespace(query), Some(params))
    }
}

/// A log line for a call in flight. It is recorded on drop, so a call abandoned mid-await
/// still produces exactly one line.
struct PendingLine<'a> {
    sink: &'a dyn QueryLogSink,
    started: Instant,
    query: String,
    params: Option<&'a [RowValues]>,
    succeeded: Option<bool>,
}

impl PendingLine<'_> {
    fn done(mut self, succeeded: bool) {
        self.succeeded = Some(succeeded);
    }

    fn finish<T>(self, result: Result<T, SqlHelperDbError>) -> Result<T, SqlHelperDbError> {
        self.done(result.is_ok());
        result
    }
}

impl Drop for PendingLine<'_> {
    fn drop(&mut self) {
        self.sink.record(&QueryLogEntry {
            elapsed: self.started.elapsed(),
            query: std::mem::take(&mut self.query),
            params: self.params.map(<[RowValues]>::to_vec),
            succeeded: self.succeeded == Some(true),
            cancelled: self.succeeded.is_none(),
        });
    }
}

impl<C: fmt::Debug> fmt::Debug for LoggingDecorator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingDecorator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: DbClient> DbClient for LoggingDecorator<C> {
    async fn exec(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.exec(query, params).await)
    }

    async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
        let line = self.line(normalize_whitespace(query), None);
        line.finish(self.inner.prepare(query).await)
    }

    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.query(query, params).await)
    }

    async fn begin_transaction(
        &self,
        options: TxOptions,
    ) -> Result<Transaction, SqlHelperDbError> {
        let line = self.line(format!("BEGIN {options:?}"), None);
        line.finish(self.inner.begin_transaction(options).await)
    }

    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
        self.inner.is_duplicate_key(err)
    }

    fn reports_insert_id(&self) -> bool {
        self.inner.reports_insert_id()
    }

    async fn query_row(&self, query: &str, params: &[RowValues]) -> SingleRow {
        let line = self.call(query, params);
        let row = self.inner.query_row(query, params).await;
        line.done(!row.is_err());
        row
    }

    async fn select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<CustomDbRow>, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.select(query, params).await)
    }

    async fn get(&self, query: &str, params: &[RowValues]) -> Result<CustomDbRow, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.get(query, params).await)
    }

    async fn insert(&self, query: &str, params: &[RowValues]) -> Result<i64, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.insert(query, params).await)
    }

    async fn insert_returning_id(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<i64, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.insert_returning_id(query, params).await)
    }

    async fn insert_ignore(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<bool, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.insert_ignore(query, params).await)
    }

    async fn update(&self, query: &str, params: &[RowValues]) -> Result<u64, SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.update(query, params).await)
    }

    async fn update_one(&self, query: &str, params: &[RowValues]) -> Result<(), SqlHelperDbError> {
        let line = self.call(query, params);
        line.finish(self.inner.update_one(query, params).await)
    }

    async fn get_or_create(
        &self,
        select_query: &str,
        insert_query: &str,
        params: &[RowValues],
    ) -> Result<CustomDbRow, SqlHelperDbError> {
        let query = format!(
            "{}; {}",
            normalize_whitespace(select_query),
            normalize_whitespace(insert_query)
        );
        let line = self.line(query, Some(params));
        line.finish(
            self.inner
                .get_or_create(select_query, insert_query, params)
                .await,
        )
    }
}
