//! Error types for domo-store.

use std::path::PathBuf;

/// Result type for domo-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in domo-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed caller input, rejected before touching storage.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transient lock contention or connectivity loss; retryable.
    #[error("Storage unavailable: {0}")]
    Unavailable(rusqlite::Error),

    /// Any other database error from SQLite.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Corrupt database file or schema mismatch; fatal, never retried.
    #[error("Database corrupt: {0}")]
    Corrupt(String),

    /// Failed to create the database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored timestamp could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the operation that produced this error may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        let code = match &e {
            rusqlite::Error::SqliteFailure(err, _) => Some(err.code),
            _ => None,
        };
        match code {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                Error::Unavailable(e)
            }
            Some(rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase) => {
                Error::Corrupt(e.to_string())
            }
            _ => Error::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_unavailable() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let err = Error::from(busy);
        assert!(err.is_transient());
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[test]
    fn test_other_sqlite_errors_are_not_transient() {
        let err = Error::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_transient());
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_invalid_argument_is_not_transient() {
        assert!(!Error::InvalidArgument("limit".to_string()).is_transient());
    }
}
