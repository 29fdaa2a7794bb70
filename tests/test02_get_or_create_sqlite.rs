#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sql_helpers::prelude::*;
use sql_helpers::{PreparedStatement, Transaction};

use common::{memory_client, unique_db_path};

const SELECT_TAG: &str = "SELECT id, name, color FROM tags WHERE name = ?1";
const INSERT_TAG: &str = "INSERT INTO tags (name, color) VALUES (?1, ?2)";

async fn tags_table(client: &Client) -> Result<(), SqlHelperDbError> {
    client
        .exec(
            "CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                color TEXT
            )",
            &[],
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn creates_then_reuses() -> Result<(), SqlHelperDbError> {
    let client = memory_client().await?;
    tags_table(&client).await?;

    let created = client
        .get_or_create(SELECT_TAG, INSERT_TAG, &["rust".into(), "orange".into()])
        .await?;
    assert_eq!(created.get("id"), Some(&RowValues::Int(1)));
    assert_eq!(created.get("color"), Some(&RowValues::Text("orange".into())));

    // the second color is never written; the existing row wins
    let reused = client
        .get_or_create(SELECT_TAG, INSERT_TAG, &["rust".into(), "blue".into()])
        .await?;
    assert_eq!(reused.get("id"), Some(&RowValues::Int(1)));
    assert_eq!(reused.get("color"), Some(&RowValues::Text("orange".into())));

    let count = client.get("SELECT COUNT(*) AS n FROM tags", &[]).await?;
    assert_eq!(count.get("n"), Some(&RowValues::Int(1)));
    Ok(())
}

#[tokio::test]
async fn empty_params_issue_no_query() -> Result<(), SqlHelperDbError> {
    let client = memory_client().await?;
    // no table exists, so any issued query would fail with a driver error instead
    let err = client
        .get_or_create(SELECT_TAG, INSERT_TAG, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, SqlHelperDbError::NoArguments));
    assert_eq!(err.to_string(), "no arguments provided");
    Ok(())
}

#[tokio::test]
async fn select_failures_propagate() -> Result<(), SqlHelperDbError> {
    let client = memory_client().await?;
    let err = client
        .get_or_create(SELECT_TAG, INSERT_TAG, &["rust".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, SqlHelperDbError::SqliteError(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn non_duplicate_insert_failures_propagate() -> Result<(), SqlHelperDbError> {
    let client = memory_client().await?;
    client
        .exec(
            "CREATE TABLE strict_tags (name TEXT PRIMARY KEY, color TEXT NOT NULL)",
            &[],
        )
        .await?;
    let err = client
        .get_or_create(
            "SELECT name FROM strict_tags WHERE name = ?1",
            "INSERT INTO strict_tags (name, color) VALUES (?1, NULL)",
            &["rust".into()],
        )
        .await
        .unwrap_err();
    assert!(!client.is_duplicate_key(&err));
    assert!(matches!(err, SqlHelperDbError::SqliteError(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn typed_destination() -> Result<(), SqlHelperDbError> {
    struct Tag {
        id: i64,
    }
    impl FromRow for Tag {
        fn from_row(row: &CustomDbRow) -> Result<Self, SqlHelperDbError> {
            match row.try_get("id")? {
                RowValues::Int(id) => Ok(Tag { id: *id }),
                other => Err(SqlHelperDbError::ExecutionError(format!("bad id {other:?}"))),
            }
        }
    }

    let client = memory_client().await?;
    tags_table(&client).await?;
    let tag: Tag = client
        .get_or_create_as(SELECT_TAG, INSERT_TAG, &["typed".into(), RowValues::Null])
        .await?;
    assert_eq!(tag.id, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_converge_on_one_row() -> Result<(), Box<dyn std::error::Error>> {
    let opts = SqliteOptionsBuilder::new(unique_db_path("get_or_create_race"))
        .busy_timeout(Duration::from_secs(10))
        .max_connections(8)
        .finish();
    let client = Arc::new(Client::open_sqlite(opts).await?);
    tags_table(&client).await?;

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client
                .get_or_create(
                    SELECT_TAG,
                    INSERT_TAG,
                    &["shared".into(), format!("color-{i}").into()],
                )
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let row = handle.await??;
        ids.push(row.get("id").cloned());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "every caller must see the same row: {ids:?}");

    let count = client
        .get("SELECT COUNT(*) AS n FROM tags WHERE name = ?1", &["shared".into()])
        .await?;
    assert_eq!(count.get("n"), Some(&RowValues::Int(1)));
    Ok(())
}

/// Misses the first lookup, as if another writer inserted the key right after it ran.
struct MissFirstSelect<C> {
    inner: C,
    missed: AtomicBool,
}

#[async_trait::async_trait]
impl<C: DbClient> DbClient for MissFirstSelect<C> {
    async fn exec(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        self.inner.exec(query, params).await
    }

    async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
        self.inner.prepare(query).await
    }

    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        if !self.missed.swap(true, Ordering::SeqCst) {
            return Ok(ResultSet::default());
        }
        self.inner.query(query, params).await
    }

    async fn begin_transaction(
        &self,
        options: TxOptions,
    ) -> Result<Transaction, SqlHelperDbError> {
        self.inner.begin_transaction(options).await
    }

    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
        self.inner.is_duplicate_key(err)
    }
}

#[tokio::test]
async fn collisions_resolve_through_decorated_clients() -> Result<(), SqlHelperDbError> {
    let client = memory_client().await?;
    tags_table(&client).await?;
    client
        .insert(INSERT_TAG, &["taken".into(), "red".into()])
        .await?;

    let sink = Arc::new(MemorySink::new());
    let racing = MissFirstSelect {
        inner: ErrorDecorator::new(LoggingDecorator::new(&client, sink.clone()), "tags"),
        missed: AtomicBool::new(false),
    };
    let row = racing
        .get_or_create(SELECT_TAG, INSERT_TAG, &["taken".into(), "green".into()])
        .await?;
    assert_eq!(row.get("color"), Some(&RowValues::Text("red".into())));

    // the losing insert was annotated and logged, then the refetch found the winner
    let lines = sink.lines();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert!(lines[0].contains("INSERT INTO tags"));
    assert!(lines[1].contains("SELECT id, name, color FROM tags"));
    Ok(())
}
