//! Duplicate-key detection, injected per dialect.
//!
//! `get_or_create` treats an insert failure as a lost race only when the client's predicate
//! says the store rejected a duplicate unique key. All built-ins look through
//! [`SqlHelperDbError::Annotated`] layers.

use std::sync::Arc;

use crate::error::SqlHelperDbError;
use crate::types::DatabaseType;

/// Decides whether an error is a duplicate unique-key violation.
pub type DuplicateKeyPredicate = Arc<dyn Fn(&SqlHelperDbError) -> bool + Send + Sync>;

/// `SQLite`: extended result codes `SQLITE_CONSTRAINT_UNIQUE` and `SQLITE_CONSTRAINT_PRIMARYKEY`.
#[cfg(feature = "sqlite")]
#[must_use]
pub fn sqlite_duplicate_key(err: &SqlHelperDbError) -> bool {
    match err.root() {
        SqlHelperDbError::SqliteError(rusqlite::Error::SqliteFailure(code, _)) => matches!(
            code.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

/// Postgres: SQLSTATE `23505` (`unique_violation`).
#[cfg(feature = "postgres")]
#[must_use]
pub fn postgres_duplicate_key(err: &SqlHelperDbError) -> bool {
    match err.root() {
        SqlHelperDbError::PostgresError(e) => {
            e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION)
        }
        _ => false,
    }
}

/// For stores where collisions should surface as plain insert failures.
#[must_use]
pub fn never_duplicate_key(_err: &SqlHelperDbError) -> bool {
    false
}

/// The built-in predicate for `db_type`.
#[must_use]
pub fn duplicate_key_predicate_for(db_type: DatabaseType) -> DuplicateKeyPredicate {
    match db_type {
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => Arc::new(postgres_duplicate_key),
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => Arc::new(sqlite_duplicate_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sqlite")]
    fn sqlite_failure(extended_code: std::os::raw::c_int) -> SqlHelperDbError {
        SqlHelperDbError::SqliteError(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(extended_code),
            Some("constraint failed".into()),
        ))
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_unique_and_primary_key_are_duplicates() {
        assert!(sqlite_duplicate_key(&sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )));
        assert!(sqlite_duplicate_key(&sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )));
        assert!(!sqlite_duplicate_key(&sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL
        )));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_predicate_sees_through_annotations() {
        let err = sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
            .annotate("users::insert")
            .annotate("service::insert");
        assert!(sqlite_duplicate_key(&err));
    }

    #[test]
    fn other_errors_are_never_duplicates() {
        assert!(!never_duplicate_key(&SqlHelperDbError::NoRows));
        #[cfg(feature = "sqlite")]
        assert!(!sqlite_duplicate_key(&SqlHelperDbError::NoRows));
        #[cfg(feature = "postgres")]
        assert!(!postgres_duplicate_key(&SqlHelperDbError::Other("x".into())));
    }
}
