//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and traits
//! to make it easier to get started with the library.

pub use crate::client::{Client, ClientOptions, DbClient, DbClientExt, SingleRow};
pub use crate::decorators::{ErrorDecorator, LoggingDecorator, MemorySink, QueryLogSink};
pub use crate::error::SqlHelperDbError;
pub use crate::pool::ConfigAndPool;
pub use crate::results::{CustomDbRow, FromRow, ResultSet};
pub use crate::transaction::{TxBehavior, TxOptions};
pub use crate::types::{DatabaseType, ExecSummary, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresOptions;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};
