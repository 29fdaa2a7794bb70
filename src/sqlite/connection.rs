use std::sync::Arc;
use std::time::Duration;

use rusqlite::OpenFlags;
use tokio::sync::Mutex;

use crate::error::SqlHelperDbError;

/// A rusqlite connection shared with blocking worker threads.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

pub type SqlitePool = bb8::Pool<SqliteManager>;

/// bb8 manager opening rusqlite connections with the configured pragmas.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    db_path: String,
    busy_timeout: Duration,
    wal: bool,
}

impl SqliteManager {
    #[must_use]
    pub fn new(db_path: String, busy_timeout: Duration, wal: bool) -> Self {
        Self {
            db_path,
            busy_timeout,
            wal,
        }
    }
}

impl bb8::ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = SqlHelperDbError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let path = self.db_path.clone();
        let busy_timeout = self.busy_timeout;
        let wal = self.wal;
        let conn = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open_with_flags(&path, OpenFlags::default())?;
            conn.busy_timeout(busy_timeout)?;
            if wal {
                // in-memory databases answer "memory"; either way the pragma returns a row
                let _mode: String = conn.pragma_update_and_check(
                    None,
                    "journal_mode",
                    "WAL",
                    |row| row.get(0),
                )?;
            }
            Ok::<_, SqlHelperDbError>(conn)
        })
        .await
        .map_err(|e| {
            SqlHelperDbError::ConnectionError(format!("sqlite open join error: {e}"))
        })??;
        Ok(Arc::new(Mutex::new(conn)))
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        run_blocking(Arc::clone(conn), |guard| {
            guard
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(SqlHelperDbError::SqliteError)
        })
        .await
    }

    /// A connection left inside a transaction must not be handed out again. A connection
    /// still locked by an in-flight autocommit statement is kept.
    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.try_lock().is_ok_and(|guard| !guard.is_autocommit())
    }
}

/// Run `func` against the connection on the blocking pool.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlHelperDbError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlHelperDbError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlHelperDbError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

/// Check a connection out of the pool.
pub(crate) async fn checkout(
    pool: &SqlitePool,
) -> Result<bb8::PooledConnection<'static, SqliteManager>, SqlHelperDbError> {
    pool.get_owned()
        .await
        .map_err(|e| SqlHelperDbError::ConnectionError(format!("sqlite checkout error: {e}")))
}

#[cfg(test)]
mod tests {
    use bb8::ManageConnection;

    use super::*;

    #[tokio::test]
    async fn open_transaction_marks_connection_broken() {
        let manager = SqliteManager::new(":memory:".into(), Duration::from_secs(1), false);
        let mut conn = manager.connect().await.unwrap();
        assert!(!manager.has_broken(&mut conn));

        conn.lock().await.execute_batch("BEGIN").unwrap();
        assert!(manager.has_broken(&mut conn));

        conn.lock().await.execute_batch("ROLLBACK").unwrap();
        assert!(!manager.has_broken(&mut conn));
    }
}
