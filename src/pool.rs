#[cfg(feature = "postgres")]
use deadpool_postgres::Pool as DeadpoolPostgresPool;

#[cfg(feature = "sqlite")]
use crate::sqlite::SqlitePool;

use crate::error::SqlHelperDbError;
use crate::types::DatabaseType;

/// Connection pool for database access
///
/// This enum wraps the different connection pool types for the
/// supported database engines.
#[derive(Clone)]
pub enum MiddlewarePool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(DeadpoolPostgresPool),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

impl std::fmt::Debug for MiddlewarePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f.debug_tuple("Postgres").field(&pool.status()).finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
        }
    }
}

/// Configuration and connection pool for a database
///
/// The opaque store handle behind a [`crate::Client`]. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct ConfigAndPool {
    /// The connection pool
    pub pool: MiddlewarePool,
    /// The database type
    pub db_type: DatabaseType,
}

impl ConfigAndPool {
    /// Verify connectivity with a `SELECT 1` round trip.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError` if a connection cannot be obtained or the query fails.
    pub async fn ping(&self) -> Result<(), SqlHelperDbError> {
        match &self.pool {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => crate::postgres::ping(pool).await,
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => crate::sqlite::ping(pool).await,
        }
    }
}
