use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::dialect::{DuplicateKeyPredicate, duplicate_key_predicate_for};
use crate::error::SqlHelperDbError;
use crate::pool::{ConfigAndPool, MiddlewarePool};
use crate::prepared::PreparedStatement;
use crate::results::ResultSet;
use crate::transaction::{Transaction, TxOptions};
use crate::types::{DatabaseType, ExecSummary, RowValues};

#[cfg(feature = "postgres")]
use crate::postgres::{PostgresOptions, PostgresPreparedStatement, PostgresTx};
#[cfg(feature = "sqlite")]
use crate::sqlite::{SqliteOptions, SqlitePreparedStatement, SqliteTx};

use super::DbClient;

/// Per-client knobs.
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Deadline applied to every primitive; `None` waits forever.
    pub statement_timeout: Option<Duration>,
    /// Overrides the dialect's built-in duplicate-key predicate.
    pub duplicate_key: Option<DuplicateKeyPredicate>,
}

impl ClientOptions {
    #[must_use]
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn duplicate_key<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SqlHelperDbError) -> bool + Send + Sync + 'static,
    {
        self.duplicate_key = Some(std::sync::Arc::new(predicate));
        self
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("statement_timeout", &self.statement_timeout)
            .field("duplicate_key", &self.duplicate_key.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// The undecorated client: runs every operation straight against the store handle.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Client {
    cap: ConfigAndPool,
    options: ClientOptions,
    duplicate_key: DuplicateKeyPredicate,
}

impl Client {
    /// Wrap an already-open store handle with default options.
    #[must_use]
    pub fn new(cap: ConfigAndPool) -> Self {
        Self::with_options(cap, ClientOptions::default())
    }

    #[must_use]
    pub fn with_options(cap: ConfigAndPool, options: ClientOptions) -> Self {
        let duplicate_key = options
            .duplicate_key
            .clone()
            .unwrap_or_else(|| duplicate_key_predicate_for(cap.db_type));
        Self {
            cap,
            options,
            duplicate_key,
        }
    }

    /// Open a `SQLite` database and verify it answers `SELECT 1`.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the pool cannot be created or the check fails.
    #[cfg(feature = "sqlite")]
    pub async fn open_sqlite(opts: SqliteOptions) -> Result<Self, SqlHelperDbError> {
        Ok(Self::new(ConfigAndPool::new_sqlite(opts).await?))
    }

    /// Open a Postgres pool and verify it answers `SELECT 1`.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if the config is incomplete, the pool cannot be created or
    /// the check fails.
    #[cfg(feature = "postgres")]
    pub async fn open_postgres(opts: PostgresOptions) -> Result<Self, SqlHelperDbError> {
        Ok(Self::new(ConfigAndPool::new_postgres(opts).await?))
    }

    /// The shared store handle.
    #[must_use]
    pub fn handle(&self) -> &ConfigAndPool {
        &self.cap
    }

    #[must_use]
    pub fn db_type(&self) -> DatabaseType {
        self.cap.db_type
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, SqlHelperDbError>
    where
        F: Future<Output = Result<T, SqlHelperDbError>>,
    {
        match self.options.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| SqlHelperDbError::Timeout(limit))?,
            None => fut.await,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("cap", &self.cap)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DbClient for Client {
    async fn exec(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ExecSummary, SqlHelperDbError> {
        self.bounded(async {
            match &self.cap.pool {
                #[cfg(feature = "postgres")]
                MiddlewarePool::Postgres(pool) => crate::postgres::execute(pool, query, params).await,
                #[cfg(feature = "sqlite")]
                MiddlewarePool::Sqlite(pool) => crate::sqlite::execute(pool, query, params).await,
            }
        })
        .await
    }

    async fn prepare(&self, query: &str) -> Result<PreparedStatement, SqlHelperDbError> {
        self.bounded(async {
            match &self.cap.pool {
                #[cfg(feature = "postgres")]
                MiddlewarePool::Postgres(pool) => Ok(PreparedStatement::Postgres(
                    PostgresPreparedStatement::prepare(pool, query).await?,
                )),
                #[cfg(feature = "sqlite")]
                MiddlewarePool::Sqlite(pool) => Ok(PreparedStatement::Sqlite(
                    SqlitePreparedStatement::prepare(pool, query).await?,
                )),
            }
        })
        .await
    }

    async fn query(&self, query: &str, params: &[RowValues]) -> Result<ResultSet, SqlHelperDbError> {
        self.bounded(async {
            match &self.cap.pool {
                #[cfg(feature = "postgres")]
                MiddlewarePool::Postgres(pool) => crate::postgres::query(pool, query, params).await,
                #[cfg(feature = "sqlite")]
                MiddlewarePool::Sqlite(pool) => crate::sqlite::query(pool, query, params).await,
            }
        })
        .await
    }

    async fn begin_transaction(
        &self,
        options: TxOptions,
    ) -> Result<Transaction, SqlHelperDbError> {
        self.bounded(async {
            match &self.cap.pool {
                #[cfg(feature = "postgres")]
                MiddlewarePool::Postgres(pool) => {
                    Ok(Transaction::Postgres(PostgresTx::begin(pool, options).await?))
                }
                #[cfg(feature = "sqlite")]
                MiddlewarePool::Sqlite(pool) => {
                    Ok(Transaction::Sqlite(SqliteTx::begin(pool, options).await?))
                }
            }
        })
        .await
    }

    fn is_duplicate_key(&self, err: &SqlHelperDbError) -> bool {
        (self.duplicate_key)(err)
    }

    fn reports_insert_id(&self) -> bool {
        self.cap.db_type.reports_last_insert_id()
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::decorators::ErrorDecorator;

    #[tokio::test]
    async fn custom_predicate_replaces_dialect_default() {
        let cap = ConfigAndPool::new_sqlite(SqliteOptions::new(":memory:".into()))
            .await
            .unwrap();
        let client = Client::with_options(
            cap,
            ClientOptions::default().duplicate_key(|e| e.is_no_rows()),
        );
        assert!(client.is_duplicate_key(&SqlHelperDbError::NoRows));
        assert!(!client.is_duplicate_key(&SqlHelperDbError::NoArguments));
    }

    #[tokio::test]
    async fn sqlite_client_reports_insert_ids() {
        let client = Client::new(
            ConfigAndPool::new_sqlite(SqliteOptions::new(":memory:".into()))
                .await
                .unwrap(),
        );
        assert!(client.reports_insert_id());
        assert!(ErrorDecorator::new(&client, "ids").reports_insert_id());
    }

    #[tokio::test]
    async fn elapsed_deadline_is_a_timeout_error() {
        let cap = ConfigAndPool::new_sqlite(SqliteOptions::new(":memory:".into()))
            .await
            .unwrap();
        let client = Client::with_options(
            cap,
            ClientOptions::default().statement_timeout(Duration::from_millis(5)),
        );
        let err = client
            .bounded(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, SqlHelperDbError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SqlHelperDbError::Timeout(d) if d == Duration::from_millis(5)));
    }
}
