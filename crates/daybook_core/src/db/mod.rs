//! SQLite file behind the per-user document collections.
//!
//! # Responsibility
//! - Open the database that holds item records and task completion logs,
//!   one JSON document per row of the `documents` table.
//! - Bring that table to the schema this build expects before any service
//!   reads or writes a document.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A file written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or migrate the document database.
///
/// Wrapped by `RepoError::Db` once a `DocumentStore` is in use.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file's schema is ahead of `migrations::latest_version()`.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code for logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn schema_too_new_names_both_versions() {
        let err = DbError::UnsupportedSchemaVersion {
            db_version: 7,
            latest_supported: 2,
        };
        assert_eq!(err.code(), "db_schema_too_new");
        assert_eq!(
            err.to_string(),
            "database schema version 7 is newer than supported 2"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn sqlite_errors_keep_their_source() {
        let err = DbError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(err.code(), "db_sqlite");
        assert!(err.source().is_some());
    }
}
