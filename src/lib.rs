//! Async SQL client helpers with composable error-annotating and query-logging decorators.
//!
//! [`Client`] runs statements against a `SQLite` or Postgres pool. Everything above the raw
//! primitives lives on the [`DbClient`] trait, so [`ErrorDecorator`] and [`LoggingDecorator`]
//! expose the same surface and can be stacked in any order:
//!
//! ```no_run
//! use std::sync::Arc;
//! use sql_helpers::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlHelperDbError> {
//! let client = Client::open_sqlite(SqliteOptions::new("app.db".into())).await?;
//! let users = ErrorDecorator::new(LoggingDecorator::with_tracing(&client), "users");
//!
//! let row = users
//!     .get_or_create(
//!         "SELECT id, name FROM users WHERE name = ?1",
//!         "INSERT INTO users (name, email) VALUES (?1, ?2)",
//!         &["alice".into(), "alice@example.com".into()],
//!     )
//!     .await?;
//! # let _ = row;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod decorators;
pub mod dialect;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod prepared;
pub mod results;
pub mod transaction;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use client::{Client, ClientOptions, DbClient, DbClientExt, SingleRow, get_or_create};
pub use decorators::{
    ErrorDecorator, LoggingDecorator, MemorySink, QueryLogEntry, QueryLogSink, TracingSink,
};
pub use dialect::DuplicateKeyPredicate;
pub use error::SqlHelperDbError;
pub use pool::{ConfigAndPool, MiddlewarePool};
pub use prepared::PreparedStatement;
pub use results::{CustomDbRow, FromRow, ResultSet};
pub use transaction::{Transaction, TxBehavior, TxOptions};
pub use types::{DatabaseType, ExecSummary, RowValues};
