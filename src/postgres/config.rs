use deadpool_postgres::Config as PgConfig;
use tokio_postgres::NoTls;

use crate::error::SqlHelperDbError;
use crate::pool::{ConfigAndPool, MiddlewarePool};
use crate::types::DatabaseType;

/// Options for configuring a Postgres pool.
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    pub config: PgConfig,
}

impl PostgresOptions {
    #[must_use]
    pub fn new(config: PgConfig) -> Self {
        Self { config }
    }

    /// Every connection field the pool needs must be present up front.
    fn validate(&self) -> Result<(), SqlHelperDbError> {
        let cfg = &self.config;
        let missing = [
            ("dbname", cfg.dbname.is_none()),
            ("host", cfg.host.is_none()),
            ("port", cfg.port.is_none()),
            ("user", cfg.user.is_none()),
            ("password", cfg.password.is_none()),
        ];
        match missing.iter().find(|(_, absent)| *absent) {
            Some((field, _)) => Err(SqlHelperDbError::ConfigError(format!(
                "{field} is required"
            ))),
            None => Ok(()),
        }
    }
}

impl ConfigAndPool {
    /// Create a deadpool-postgres pool and verify one connection works.
    ///
    /// # Errors
    /// Returns `SqlHelperDbError::ConfigError` if required config fields are missing or
    /// `SqlHelperDbError::ConnectionError` if pool creation fails.
    pub async fn new_postgres(opts: PostgresOptions) -> Result<Self, SqlHelperDbError> {
        opts.validate()?;

        let pg_pool = opts
            .config
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlHelperDbError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;

        tracing::debug!(
            host = ?opts.config.host,
            dbname = ?opts.config.dbname,
            "postgres pool created"
        );

        let cap = ConfigAndPool {
            pool: MiddlewarePool::Postgres(pg_pool),
            db_type: DatabaseType::Postgres,
        };
        cap.ping().await?;
        Ok(cap)
    }
}
