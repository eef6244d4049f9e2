//! SQLite-backed table store.
//!
//! Rows live in a single table whose primary key is `(PartitionKey, RowKey)`,
//! so ISBN uniqueness is enforced by the database itself. Every row uses the
//! fixed [`BOOK_PARTITION`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{format_timestamp, BookRow, BOOK_PARTITION};
use crate::store::{validate_table_name, BookStore};

/// Default table name for book rows.
pub const DEFAULT_TABLE_NAME: &str = "books";

/// Book store over a single SQLite connection.
pub struct TableStore {
    conn: Mutex<Connection>,
    table: String,
}

impl TableStore {
    /// Open (or create) the database file at `path`. The table itself is not
    /// provisioned until [`BookStore::ensure_table_exists`] is called.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        let path = path.as_ref();
        validate_table_name(table)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), table, "opening table store");
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, table))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, table))
    }

    fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::StoreUnavailable {
            message: "connection lock poisoned".to_string(),
        })
    }
}

impl BookStore for TableStore {
    fn backend(&self) -> &'static str {
        "table"
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn ensure_table_exists(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                PartitionKey TEXT NOT NULL,
                RowKey TEXT NOT NULL,
                Title TEXT NOT NULL,
                Author TEXT NOT NULL,
                PublishYear INTEGER NOT NULL,
                Timestamp TEXT NOT NULL,
                ETag TEXT NOT NULL,
                PRIMARY KEY (PartitionKey, RowKey)
            );",
            self.table
        ))?;
        info!(table = %self.table, "table provisioned");
        Ok(())
    }

    fn table_exists(&self) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![self.table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn list_all(&self) -> Result<Vec<BookRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT PartitionKey, RowKey, Title, Author, PublishYear, Timestamp, ETag
             FROM \"{}\" WHERE PartitionKey = ?1 ORDER BY rowid",
            self.table
        ))?;
        let rows = stmt
            .query_map(params![BOOK_PARTITION], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(finish_row).collect()
    }

    fn get_by_key(&self, isbn: &str) -> Result<Option<BookRow>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT PartitionKey, RowKey, Title, Author, PublishYear, Timestamp, ETag
                     FROM \"{}\" WHERE PartitionKey = ?1 AND RowKey = ?2",
                    self.table
                ),
                params![BOOK_PARTITION, isbn],
                read_row,
            )
            .optional()?;
        row.map(finish_row).transpose()
    }

    fn insert(&self, row: BookRow) -> Result<()> {
        let row = row.stamped(Utc::now());
        let conn = self.conn()?;
        let result = conn.execute(
            &format!(
                "INSERT INTO \"{}\" (PartitionKey, RowKey, Title, Author, PublishYear, Timestamp, ETag)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.table
            ),
            params![
                row.partition_key,
                row.row_key,
                row.title,
                row.author,
                row.publish_year,
                row.timestamp.as_ref().map(format_timestamp),
                row.etag,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(Error::KeyConflict { isbn: row.row_key })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_key(&self, isbn: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            &format!(
                "DELETE FROM \"{}\" WHERE PartitionKey = ?1 AND RowKey = ?2",
                self.table
            ),
            params![BOOK_PARTITION, isbn],
        )?;
        Ok(removed > 0)
    }
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("table", &self.table)
            .finish()
    }
}

/// Row as read from SQLite, before the timestamp is parsed.
type RawRow = (BookRow, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    let timestamp: String = row.get(5)?;
    Ok((
        BookRow {
            partition_key: row.get(0)?,
            row_key: row.get(1)?,
            title: row.get(2)?,
            author: row.get(3)?,
            publish_year: row.get(4)?,
            timestamp: None,
            etag: row.get(6)?,
        },
        timestamp,
    ))
}

fn finish_row((mut row, timestamp): RawRow) -> Result<BookRow> {
    let parsed = DateTime::parse_from_rfc3339(&timestamp).map_err(|e| Error::InvalidRow {
        row_key: row.row_key.clone(),
        message: format!("bad timestamp '{}': {}", timestamp, e),
    })?;
    row.timestamp = Some(parsed.with_timezone(&Utc));
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Book;

    fn store() -> TableStore {
        let store = TableStore::open_in_memory(DEFAULT_TABLE_NAME).unwrap();
        store.ensure_table_exists().unwrap();
        store
    }

    #[test]
    fn rejects_invalid_table_name() {
        let err = TableStore::open_in_memory("bad name").unwrap_err();
        assert!(matches!(err, Error::InvalidTableName { .. }));
    }

    #[test]
    fn ensure_table_exists_is_idempotent() {
        let store = TableStore::open_in_memory("books").unwrap();
        assert!(!store.table_exists().unwrap());
        store.ensure_table_exists().unwrap();
        store.ensure_table_exists().unwrap();
        assert!(store.table_exists().unwrap());
    }

    #[test]
    fn insert_then_get_returns_stamped_row() {
        let store = store();
        let book = Book::new("111", "A", "B", 2020);
        store.insert(BookRow::from_book(&book)).unwrap();

        let row = store.get_by_key("111").unwrap().expect("row exists");
        assert!(row.timestamp.is_some());
        assert!(row.etag.as_deref().unwrap().starts_with("W/\"datetime'"));
        assert_eq!(Book::from(row), book);
    }

    #[test]
    fn timestamp_and_etag_share_one_format() {
        let store = store();
        store
            .insert(BookRow::from_book(&Book::new("111", "A", "B", 2020)))
            .unwrap();

        let stored: String = store
            .conn()
            .unwrap()
            .query_row("SELECT Timestamp FROM books WHERE RowKey = '111'", [], |r| r.get(0))
            .unwrap();
        assert!(stored.ends_with('Z'));
        assert_eq!(stored.len(), "2024-05-01T12:00:00.000000Z".len());

        let row = store.get_by_key("111").unwrap().expect("row exists");
        let timestamp = row.timestamp.expect("timestamp");
        assert_eq!(format_timestamp(&timestamp), stored);
        assert_eq!(row.etag, Some(crate::model::etag_for(&timestamp)));
    }

    #[test]
    fn get_missing_key_is_none() {
        assert!(store().get_by_key("nope").unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_is_key_conflict() {
        let store = store();
        let book = Book::new("111", "A", "B", 2020);
        store.insert(BookRow::from_book(&book)).unwrap();

        let err = store
            .insert(BookRow::from_book(&Book::new("111", "Other", "C", 1990)))
            .unwrap_err();
        assert!(matches!(err, Error::KeyConflict { ref isbn } if isbn == "111"));

        let row = store.get_by_key("111").unwrap().unwrap();
        assert_eq!(row.title, "A");
    }

    #[test]
    fn list_all_preserves_insertion_order() {
        let store = store();
        for isbn in ["3", "1", "2"] {
            store
                .insert(BookRow::from_book(&Book::new(isbn, "T", "A", 2000)))
                .unwrap();
        }
        let keys: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.row_key)
            .collect();
        assert_eq!(keys, vec!["3", "1", "2"]);
    }

    #[test]
    fn delete_reports_whether_row_existed() {
        let store = store();
        store
            .insert(BookRow::from_book(&Book::new("1", "T", "A", 2000)))
            .unwrap();
        assert!(store.delete_by_key("1").unwrap());
        assert!(!store.delete_by_key("1").unwrap());
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn operations_fail_before_provisioning() {
        let store = TableStore::open_in_memory("books").unwrap();
        assert!(matches!(store.list_all(), Err(Error::Sqlite(_))));
    }
}
