//! Test doubles shared by the Bookshelf crates.
//!
//! Enable the `test-utils` feature to use these from dependent crates.

use crate::error::{Error, Result};
use crate::model::{Book, BookRow};
use crate::store::BookStore;

/// The book used by the end-to-end scenario tests.
pub fn sample_book() -> Book {
    Book::new("111", "A", "B", 2020)
}

/// A handful of distinct books for list tests.
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("9780441013593", "Dune", "Frank Herbert", 1965),
        Book::new("9780553293357", "Foundation", "Isaac Asimov", 1951),
        Book::new("9780345391803", "The Hitchhiker's Guide to the Galaxy", "Douglas Adams", 1979),
    ]
}

/// Which store calls a [`FailingStore`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call fails.
    All,
    /// Reads succeed against an empty table; inserts and deletes fail.
    Writes,
    /// Reads succeed against an empty table; inserts report a key conflict.
    InsertConflict,
}

/// Store double that fails on demand.
#[derive(Debug, Clone)]
pub struct FailingStore {
    mode: FailureMode,
}

impl FailingStore {
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }

    fn injected() -> Error {
        Error::StoreUnavailable {
            message: "injected failure".to_string(),
        }
    }

    fn read<T>(&self, value: T) -> Result<T> {
        match self.mode {
            FailureMode::All => Err(Self::injected()),
            _ => Ok(value),
        }
    }
}

impl BookStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    fn table_name(&self) -> &str {
        "failing"
    }

    fn ensure_table_exists(&self) -> Result<()> {
        self.read(())
    }

    fn table_exists(&self) -> Result<bool> {
        self.read(true)
    }

    fn list_all(&self) -> Result<Vec<BookRow>> {
        self.read(Vec::new())
    }

    fn get_by_key(&self, _isbn: &str) -> Result<Option<BookRow>> {
        self.read(None)
    }

    fn insert(&self, row: BookRow) -> Result<()> {
        match self.mode {
            FailureMode::InsertConflict => Err(Error::KeyConflict { isbn: row.row_key }),
            _ => Err(Self::injected()),
        }
    }

    fn delete_by_key(&self, _isbn: &str) -> Result<bool> {
        match self.mode {
            FailureMode::InsertConflict => Ok(false),
            _ => Err(Self::injected()),
        }
    }
}
