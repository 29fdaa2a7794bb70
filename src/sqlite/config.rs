use std::time::Duration;

use crate::error::SqlHelperDbError;
use crate::pool::{ConfigAndPool, MiddlewarePool};
use crate::types::DatabaseType;

use super::connection::SqliteManager;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Options for configuring a `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub busy_timeout: Duration,
    pub wal: bool,
    pub max_connections: u32,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            wal: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// A private `:memory:` database only exists on the connection that opened it.
    fn effective_max_connections(&self) -> u32 {
        if self.db_path == ":memory:" {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.opts.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build a `ConfigAndPool` for `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqlHelperDbError` if pool creation or the initial smoke test fails.
    pub async fn build(self) -> Result<ConfigAndPool, SqlHelperDbError> {
        ConfigAndPool::new_sqlite(self.finish()).await
    }
}

impl ConfigAndPool {
    #[must_use]
    pub fn sqlite_builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Open a bb8 pool of rusqlite connections and verify one connection works.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError::ConnectionError` if pool creation or the connection test fails.
    pub async fn new_sqlite(opts: SqliteOptions) -> Result<Self, SqlHelperDbError> {
        let max_size = opts.effective_max_connections();
        let manager = SqliteManager::new(opts.db_path.clone(), opts.busy_timeout, opts.wal);

        let pool = bb8::Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|e| {
                SqlHelperDbError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
            })?;

        tracing::debug!(db_path = %opts.db_path, max_size, "sqlite pool created");

        let cap = ConfigAndPool {
            pool: MiddlewarePool::Sqlite(pool),
            db_type: DatabaseType::Sqlite,
        };
        cap.ping().await?;
        Ok(cap)
    }
}
