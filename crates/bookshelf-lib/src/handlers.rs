//! Request handlers for the book endpoints.
//!
//! Each handler is a plain function of its inputs and a [`BookStore`]; the
//! hosting surface (HTTP service, Lambda, tests) is responsible for
//! extracting inputs and writing the [`HandlerResponse`] back out.
//!
//! Store failures that have no dedicated error payload (list, get, and the
//! create pre-check) are returned as `Err` so the host can answer with a
//! generic server error.

use http::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{Book, BookRow};
use crate::problem::ErrorBody;
use crate::store::BookStore;

/// JSON payload carried by a handler response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Books(Vec<Book>),
    Book(Book),
    Error(ErrorBody),
}

/// Status code plus optional JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub payload: Option<Payload>,
}

impl HandlerResponse {
    pub fn new(status: StatusCode, payload: Payload) -> Self {
        Self {
            status,
            payload: Some(payload),
        }
    }

    /// Response with no body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Serialized body, or `None` when the response carries no payload.
    pub fn body_json(&self) -> Result<Option<Vec<u8>>> {
        self.payload
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::from)
    }

    /// Error body, if this is a structured error response.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match &self.payload {
            Some(Payload::Error(body)) => Some(body),
            _ => None,
        }
    }
}

/// `GET /book`: every stored book, as a JSON array.
pub fn list_books(store: &dyn BookStore, request_id: &str) -> Result<HandlerResponse> {
    info!(request_id, "processing request for list books endpoint");

    let books: Vec<Book> = store.list_all()?.into_iter().map(Book::from).collect();

    info!(request_id, count = books.len(), "books listed");
    Ok(HandlerResponse::new(StatusCode::OK, Payload::Books(books)))
}

/// `GET /book/{isbn}`: a single book, or 404 `BookNotFound`.
pub fn get_book(store: &dyn BookStore, isbn: &str, request_id: &str) -> Result<HandlerResponse> {
    info!(request_id, isbn, "processing request to get book by isbn");

    match store.get_by_key(isbn)? {
        Some(row) => Ok(HandlerResponse::new(
            StatusCode::OK,
            Payload::Book(Book::from(row)),
        )),
        None => Ok(HandlerResponse::new(
            StatusCode::NOT_FOUND,
            Payload::Error(ErrorBody::book_not_found()),
        )),
    }
}

/// `POST /book`: store a new book and echo it back.
///
/// Malformed bodies and duplicate ISBNs both answer 400 without a body. The
/// existence check and the insert are separate store calls; a concurrent
/// create that slips between them is caught by the store's own key
/// uniqueness and reported the same way.
pub fn create_book(store: &dyn BookStore, body: &[u8], request_id: &str) -> Result<HandlerResponse> {
    info!(request_id, "processing request for create book endpoint");

    let book = match serde_json::from_slice::<Option<Book>>(body) {
        Ok(Some(book)) if book.has_key() => book,
        Ok(_) => {
            warn!(request_id, "create request has no book or an empty isbn");
            return Ok(HandlerResponse::empty(StatusCode::BAD_REQUEST));
        }
        Err(e) => {
            warn!(request_id, error = %e, "failed to parse create request");
            return Ok(HandlerResponse::empty(StatusCode::BAD_REQUEST));
        }
    };

    if store.get_by_key(&book.isbn)?.is_some() {
        info!(request_id, isbn = %book.isbn, "book already exists");
        return Ok(HandlerResponse::empty(StatusCode::BAD_REQUEST));
    }

    match store.insert(BookRow::from_book(&book)) {
        Ok(()) => {
            info!(request_id, isbn = %book.isbn, "book created");
            Ok(HandlerResponse::new(StatusCode::OK, Payload::Book(book)))
        }
        Err(Error::KeyConflict { isbn }) => {
            info!(request_id, isbn = %isbn, "book created concurrently by another request");
            Ok(HandlerResponse::empty(StatusCode::BAD_REQUEST))
        }
        Err(e) => {
            warn!(request_id, isbn = %book.isbn, error = %e, "table transaction failed");
            Ok(HandlerResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                Payload::Error(ErrorBody::table_transaction()),
            ))
        }
    }
}

/// `DELETE /book/{isbn}`: remove a book. Missing keys still answer 204.
pub fn delete_book(store: &dyn BookStore, isbn: &str, request_id: &str) -> HandlerResponse {
    info!(request_id, isbn, "processing request to delete book by isbn");

    match store.delete_by_key(isbn) {
        Ok(removed) => {
            info!(request_id, isbn, removed, "delete completed");
            HandlerResponse::empty(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            warn!(request_id, isbn, error = %e, "book deletion failed");
            HandlerResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                Payload::Error(ErrorBody::book_deletion(isbn, &e.reason_phrase())),
            )
        }
    }
}
