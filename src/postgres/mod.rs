// PostgreSQL backend
//
// - config: `PostgresOptions` and `ConfigAndPool::new_postgres`
// - params: `RowValues` as `ToSql`
// - query: row extraction
// - executor: exec / query / ping against a pooled client
// - prepared, transaction: handles returned through the client contract

pub mod config;
pub mod executor;
pub mod params;
pub mod prepared;
pub mod query;
pub mod transaction;

pub use config::PostgresOptions;
pub use executor::{execute, ping, query};
pub use params::Params;
pub use prepared::PostgresPreparedStatement;
pub use query::build_result_set_from_rows;
pub use transaction::PostgresTx;
