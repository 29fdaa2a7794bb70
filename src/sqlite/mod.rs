// SQLite backend
//
// - config: pool options and `ConfigAndPool::new_sqlite`
// - connection: bb8 manager and the blocking-worker hop
// - params: `RowValues` -> rusqlite values
// - query: row extraction
// - executor: exec / query / ping against a pooled connection
// - prepared, transaction: handles returned through the client contract

pub mod config;
pub mod connection;
pub mod executor;
pub mod params;
pub mod prepared;
pub mod query;
pub mod transaction;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::{SharedSqliteConnection, SqliteManager, SqlitePool};
pub use executor::{execute, ping, query};
pub use params::Params;
pub use prepared::SqlitePreparedStatement;
pub use query::build_result_set;
pub use transaction::SqliteTx;
