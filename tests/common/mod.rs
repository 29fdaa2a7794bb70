#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_helpers::prelude::*;
use sql_helpers::{PreparedStatement, Transaction};
use tempfile::tempdir;

/// Canned outcome for the next primitive call.
pub enum Reply {
    Rows(Vec<Vec<RowValues>>),
    Exec(ExecSummary),
    Fail(SqlHelperDbError),
    /// Never completes; the caller has to give up on the call.
    Stall,
}

impl Reply {
    pub fn row(values: Vec<RowValues>) -> Self {
        Reply::Rows(vec![values])
    }

    pub fn empty() -> Self {
        Reply::Rows(Vec::new())
    }

    pub fn inserted(id: i64) -> Self {
        Reply::Exec(ExecSummary {
            rows_affected: 1,
            last_insert_id: Some(id),
        })
    }

    pub fn affected(rows_affected: u64) -> Self {
        Reply::Exec(ExecSummary {
            rows_affected,
            last_insert_id: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub query: String,
    pub params: Vec<RowValues>,
}

/// In-process `DbClient` that answers from a script and records every primitive call.
///
/// Only `exec` and `query` consume replies; the helpers run on the trait defaults. Errors
/// whose root is `Other("duplicate key")` count as duplicate-key violations.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
    no_insert_ids: bool,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            no_insert_ids: false,
        }
    }

    /// Behave like a dialect whose driver never reports an insert identity.
    pub fn without_insert_ids(mut self) -> Self {
        self.no_insert_ids = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.op).collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(&self, op: &'static str, query: &str, params: &[RowValues]) -> Reply {
        self.calls.lock().unwrap().push(Call {
            op,
            query: query.to_string(),
            params: params.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted {op}: {query}"))
    }
}

pub fn duplicate_key_error() -> SqlHelperDbError {
    SqlHelperDbError::Other("duplicate key".into())
}

pub fn rows(values: Vec<Vec<RowValues>>) -> ResultSet {
    let width = values.first().map_or(0, Vec::len);
    let mut rs = ResultSet::with_capacity(values.len());
    rs.set_column_names(Arc::new((0..width).map(|i| format!("c{i}")).collect()));
    for row in values {
        rs.add_row_values(row);
    }
    rs
}

#[async_trait]
impl DbClient for ScriptedClient {
    async fn exec(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        match self.next("exec", query, params) {
            Reply::Exec(summary) => Ok(summary),
            Reply::Fail(err) => Err(err),
            Reply::Stall => std::future::pending().await,
            Reply::Rows(_) => panic!("exec scripted with rows: {query}"),
        }
    }

    async fn prepare(&self, _query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
        Err(SqlHelperDbError::Unimplemented("prepare".into()))
    }

    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        match self.next("query", query, params) {
            Reply::Rows(values) => Ok(rows(values)),
            Reply::Fail(err) => Err(err),
            Reply::Stall => std::future::pending().await,
            Reply::Exec(_) => panic!("query scripted with exec summary: {query}"),
        }
    }

    async fn begin_transaction(
        &self,
        _options: TxOptions,
    ) -> Result<Transaction, SqlHelperDbError> {
        Err(SqlHelperDbError::Unimplemented("begin_transaction".into()))
    }

    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
        matches!(err.root(), SqlHelperDbError::Other(msg) if msg == "duplicate key")
    }

    fn reports_insert_id(&self) -> bool {
        !self.no_insert_ids
    }
}

/// File-backed database path that outlives the test body.
pub fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

#[cfg(feature = "sqlite")]
pub async fn memory_client() -> Result<Client, SqlHelperDbError> {
    Client::open_sqlite(SqliteOptions::new(":memory:".into())).await
}
