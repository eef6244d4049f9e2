use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Bookshelf library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised by `insert` when a row with the same key already exists.
    #[error("a book with isbn {isbn} already exists")]
    KeyConflict { isbn: String },

    /// Raised when a table name does not follow the table-store naming rule.
    #[error(
        "invalid table name '{name}'; expected 3-63 alphanumeric characters starting with a letter"
    )]
    InvalidTableName { name: String },

    /// Raised when the store cannot serve requests (e.g. a poisoned connection lock).
    #[error("book store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Raised when a seed file cannot be read as a list of books.
    #[error("failed to load seed books from {path}: {message}")]
    SeedLoad { path: PathBuf, message: String },

    /// Raised when a persisted row cannot be mapped back to a book.
    #[error("invalid persisted row for key {row_key}: {message}")]
    InvalidRow { row_key: String, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short reason phrase reported to callers when a store write fails.
    pub fn reason_phrase(&self) -> String {
        match self {
            Error::Sqlite(rusqlite::Error::SqliteFailure(code, Some(message))) => {
                format!("{:?}: {}", code.code, message)
            }
            Error::Sqlite(rusqlite::Error::SqliteFailure(code, None)) => format!("{:?}", code.code),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_conflict_mentions_isbn() {
        let err = Error::KeyConflict {
            isbn: "978-0".to_string(),
        };
        assert!(err.to_string().contains("978-0"));
    }

    #[test]
    fn reason_phrase_falls_back_to_display() {
        let err = Error::StoreUnavailable {
            message: "lock poisoned".to_string(),
        };
        assert_eq!(err.reason_phrase(), "book store unavailable: lock poisoned");
    }
}
