//! Store adapter contract for book rows addressed by ISBN.
//!
//! Implementations own their concurrency story: a store handle is shared
//! across simultaneous requests behind an `Arc<dyn BookStore>`.

use crate::error::Result;
use crate::model::BookRow;

/// Durable key-value persistence for book rows.
pub trait BookStore: Send + Sync {
    /// Short backend label used in logs and health output (e.g. "table").
    fn backend(&self) -> &'static str;

    /// Name of the backing table.
    fn table_name(&self) -> &str;

    /// Create the backing table if it is absent. Idempotent.
    fn ensure_table_exists(&self) -> Result<()>;

    /// Whether the backing table is currently present.
    fn table_exists(&self) -> Result<bool>;

    /// Every stored row, in insertion order.
    fn list_all(&self) -> Result<Vec<BookRow>>;

    /// The row for `isbn`, or `None` when absent.
    fn get_by_key(&self, isbn: &str) -> Result<Option<BookRow>>;

    /// Insert a new row, failing with [`Error::KeyConflict`](crate::Error::KeyConflict)
    /// when the key is taken.
    fn insert(&self, row: BookRow) -> Result<()>;

    /// Remove the row for `isbn`. Returns whether a row was removed; a missing
    /// key is not an error.
    fn delete_by_key(&self, isbn: &str) -> Result<bool>;
}

/// Check a table name against the table-store naming rule: ASCII
/// alphanumeric, starting with a letter, 3 to 63 characters.
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid = (3..=63).contains(&name.len())
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric());

    if valid {
        Ok(())
    } else {
        Err(crate::Error::InvalidTableName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_conventional_names() {
        assert!(validate_table_name("books").is_ok());
        assert!(validate_table_name("Books2024").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        let too_long = "a".repeat(64);
        for name in ["", "ab", "1books", "books;drop", "my-books", too_long.as_str()] {
            assert!(validate_table_name(name).is_err(), "{name} should be rejected");
        }
    }
}
