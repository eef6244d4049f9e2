//! Structured error payload returned by the book endpoints.
//!
//! The wire shape is `{"Error": "...", "ErrorMessage": "..."}`; field names and
//! casing are part of the public contract.

use serde::{Deserialize, Serialize};

/// Error code for lookups of an unknown ISBN.
pub const ERROR_BOOK_NOT_FOUND: &str = "BookNotFound";

/// Error code for store write failures during create.
pub const ERROR_TABLE_TRANSACTION: &str = "TableTransactionError";

/// Error code for store failures during delete.
pub const ERROR_BOOK_DELETION: &str = "BookDeletionError";

/// Machine-readable error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub error: String,
    pub error_message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_message: error_message.into(),
        }
    }

    pub fn book_not_found() -> Self {
        Self::new(
            ERROR_BOOK_NOT_FOUND,
            "There was no book found for the provided isbn.",
        )
    }

    pub fn table_transaction() -> Self {
        Self::new(
            ERROR_TABLE_TRANSACTION,
            "There was a problem executing the table transaction.",
        )
    }

    pub fn book_deletion(isbn: &str, reason: &str) -> Self {
        Self::new(
            ERROR_BOOK_DELETION,
            format!(
                "There was an error deleting the book with isbn {}: {}.",
                isbn, reason
            ),
        )
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_fields() {
        let json = serde_json::to_string(&ErrorBody::book_not_found()).unwrap();
        assert_eq!(
            json,
            r#"{"Error":"BookNotFound","ErrorMessage":"There was no book found for the provided isbn."}"#
        );
    }

    #[test]
    fn deletion_message_names_isbn_and_reason() {
        let body = ErrorBody::book_deletion("111", "disk I/O error");
        assert_eq!(body.error, ERROR_BOOK_DELETION);
        assert_eq!(
            body.error_message,
            "There was an error deleting the book with isbn 111: disk I/O error."
        );
    }
}
