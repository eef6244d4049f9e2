//! Application state fixtures for handler and router tests.

use std::sync::Arc;

use bookshelf_lib::{ApiKey, Book, BookStore, MemoryStore, TableStore};

use crate::state::AppState;

/// Function key used by [`test_state_with_key`].
pub const TEST_API_KEY: &str = "test-function-key";

/// State over a fresh, provisioned in-memory SQLite table.
///
/// # Panics
///
/// Panics if SQLite cannot open an in-memory database.
pub fn test_state() -> AppState {
    let store = TableStore::open_in_memory("books")
        .unwrap_or_else(|e| panic!("failed to open in-memory table store: {}", e));
    store
        .ensure_table_exists()
        .unwrap_or_else(|e| panic!("failed to provision test table: {}", e));
    AppState::from_store(Arc::new(store))
}

/// [`test_state`] guarded by [`TEST_API_KEY`].
pub fn test_state_with_key() -> AppState {
    test_state().with_api_key(ApiKey::new(TEST_API_KEY))
}

/// Read-only state over a memory store holding `books`.
pub fn seeded_state(books: Vec<Book>) -> AppState {
    AppState::from_store(Arc::new(MemoryStore::with_books(books))).with_read_only(true)
}
