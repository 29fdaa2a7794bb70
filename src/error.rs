use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;
#[cfg(feature = "postgres")]
use tokio_postgres;

#[derive(Debug, Error)]
pub enum SqlHelperDbError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    /// A single-row lookup matched nothing.
    #[error("no rows in result set")]
    NoRows,

    /// `update_one` touched some number of rows other than one.
    #[error("{affected} rows affected, expected 1")]
    UnexpectedRowCount { affected: u64 },

    /// `get_or_create` needs at least the lookup key.
    #[error("no arguments provided")]
    NoArguments,

    /// The statement ran but the generated identity could not be read back.
    #[error("insert id unavailable: {0}")]
    IdentityRetrieval(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Breadcrumb added by [`crate::ErrorDecorator`].
    #[error("{caller}: {source}")]
    Annotated {
        caller: String,
        source: Box<SqlHelperDbError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlHelperDbError {
    /// Wrap `self` in one more caller annotation.
    #[must_use]
    pub fn annotate(self, caller: impl Into<String>) -> Self {
        SqlHelperDbError::Annotated {
            caller: caller.into(),
            source: Box::new(self),
        }
    }

    /// The error underneath every annotation layer.
    #[must_use]
    pub fn root(&self) -> &SqlHelperDbError {
        let mut current = self;
        while let SqlHelperDbError::Annotated { source, .. } = current {
            current = source;
        }
        current
    }

    /// Caller annotations, outermost first.
    #[must_use]
    pub fn annotations(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self;
        while let SqlHelperDbError::Annotated { caller, source } = current {
            out.push(caller.as_str());
            current = source;
        }
        out
    }

    /// True when the root error is the "no rows" control signal.
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self.root(), SqlHelperDbError::NoRows)
    }
}
