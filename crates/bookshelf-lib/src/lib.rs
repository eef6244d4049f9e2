//! Bookshelf library entry points.
//!
//! This crate holds everything the hosting surfaces share: the [`Book`]
//! model, the [`BookStore`] contract with its SQLite [`TableStore`] and
//! in-process [`MemoryStore`] implementations, the four request handlers,
//! the declarative route table, and function-key authentication. The HTTP
//! service, the Lambda function and the CLI should only depend on the items
//! exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod auth;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod problem;
pub mod routes;
pub mod store;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::{is_authorized, ApiKey};
pub use error::{Error, Result};
pub use handlers::{create_book, delete_book, get_book, list_books, HandlerResponse, Payload};
pub use memory::MemoryStore;
pub use model::{Book, BookRow};
pub use problem::ErrorBody;
pub use routes::{ApiInfo, OperationId, RouteMatch, RouteTable};
pub use store::BookStore;
pub use table::{TableStore, DEFAULT_TABLE_NAME};
