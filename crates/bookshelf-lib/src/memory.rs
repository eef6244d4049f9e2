//! In-process book store.
//!
//! Holds rows for the lifetime of the owning process only. Used for the
//! read-only catalogue deployment (seeded from a JSON file at startup) and
//! as a lightweight store in tests.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Book, BookRow};
use crate::store::BookStore;

/// Table label reported by the in-memory store.
const MEMORY_TABLE_NAME: &str = "memory";

/// Book store backed by an in-process vector kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<BookRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `books`. Later duplicates of an ISBN
    /// are skipped.
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let now = Utc::now();
        let mut rows: Vec<BookRow> = Vec::new();
        for book in books {
            if rows.iter().any(|r| r.row_key == book.isbn) {
                continue;
            }
            rows.push(BookRow::from_book(&book).stamped(now));
        }
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Load a JSON array of books from `path`.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let seed_err = |message: String| Error::SeedLoad {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| seed_err(e.to_string()))?;
        let books: Vec<Book> = serde_json::from_str(&raw).map_err(|e| seed_err(e.to_string()))?;
        if let Some(book) = books.iter().find(|b| !b.has_key()) {
            return Err(seed_err(format!("book '{}' has an empty isbn", book.title)));
        }
        info!(path = %path.display(), count = books.len(), "seed books loaded");
        Ok(Self::with_books(books))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<BookRow>>> {
        self.rows.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<BookRow>>> {
        self.rows.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> Error {
    Error::StoreUnavailable {
        message: "memory store lock poisoned".to_string(),
    }
}

impl BookStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn table_name(&self) -> &str {
        MEMORY_TABLE_NAME
    }

    fn ensure_table_exists(&self) -> Result<()> {
        Ok(())
    }

    fn table_exists(&self) -> Result<bool> {
        Ok(true)
    }

    fn list_all(&self) -> Result<Vec<BookRow>> {
        Ok(self.read()?.clone())
    }

    fn get_by_key(&self, isbn: &str) -> Result<Option<BookRow>> {
        Ok(self.read()?.iter().find(|r| r.row_key == isbn).cloned())
    }

    fn insert(&self, row: BookRow) -> Result<()> {
        let mut rows = self.write()?;
        if rows.iter().any(|r| r.row_key == row.row_key) {
            return Err(Error::KeyConflict { isbn: row.row_key });
        }
        rows.push(row.stamped(Utc::now()));
        Ok(())
    }

    fn delete_by_key(&self, isbn: &str) -> Result<bool> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|r| r.row_key != isbn);
        Ok(rows.len() != before)
    }
}
