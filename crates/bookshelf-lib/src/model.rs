//! Book record and its stored-row representation.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Partition every row lives in. The table is effectively a flat map keyed by ISBN.
pub const BOOK_PARTITION: &str = "";

/// A book as seen by API callers.
///
/// Serialized with camelCase field names. Deserialization also accepts the
/// PascalCase spellings (`Isbn`, `PublishYear`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique ISBN, caller supplied and immutable once stored.
    #[serde(alias = "Isbn", alias = "ISBN")]
    pub isbn: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Author")]
    pub author: String,
    #[serde(alias = "PublishYear")]
    pub publish_year: i32,
}

impl Book {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        publish_year: i32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            publish_year,
        }
    }

    /// Whether the book carries a usable key.
    pub fn has_key(&self) -> bool {
        !self.isbn.trim().is_empty()
    }
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            isbn: row.row_key,
            title: row.title,
            author: row.author,
            publish_year: row.publish_year,
        }
    }
}

/// Persistence-layer row for a book.
///
/// `timestamp` and `etag` are maintained by the store and never read by
/// application logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub partition_key: String,
    pub row_key: String,
    pub title: String,
    pub author: String,
    pub publish_year: i32,
    pub timestamp: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl BookRow {
    /// Build an unstamped row for `book` in the fixed partition.
    pub fn from_book(book: &Book) -> Self {
        Self {
            partition_key: BOOK_PARTITION.to_string(),
            row_key: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publish_year: book.publish_year,
            timestamp: None,
            etag: None,
        }
    }

    /// Set the last-modified timestamp and the matching concurrency tag.
    ///
    /// `now` is truncated to the stored microsecond precision.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        self.etag = Some(etag_for(&now));
        self.timestamp = Some(now);
        self
    }

    pub fn isbn(&self) -> &str {
        &self.row_key
    }
}

/// Wire form of a row timestamp: RFC 3339, UTC, microseconds.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Opaque concurrency tag in the weak `datetime'...'` form used by table stores.
pub fn etag_for(timestamp: &DateTime<Utc>) -> String {
    format!("W/\"datetime'{}'\"", format_timestamp(timestamp))
}
