use bookshelf_lib::problem::ERROR_BOOK_NOT_FOUND;
use bookshelf_lib::{
    create_book, delete_book, get_book, list_books, Book, BookStore, Payload, TableStore,
};
use http::StatusCode;
use tempfile::tempdir;

const REQ: &str = "req-lifecycle";

fn provisioned_store(dir: &std::path::Path) -> TableStore {
    let store = TableStore::open(dir.join("books.db"), "books").expect("open store");
    store.ensure_table_exists().expect("provision table");
    store
}

fn json(book: &Book) -> Vec<u8> {
    serde_json::to_vec(book).expect("serialize book")
}

#[test]
fn create_get_duplicate_delete_scenario() {
    let dir = tempdir().expect("temp dir");
    let store = provisioned_store(dir.path());
    let book = Book::new("111", "A", "B", 2020);

    let created = create_book(&store, &json(&book), REQ).unwrap();
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.payload, Some(Payload::Book(book.clone())));

    let fetched = get_book(&store, "111", REQ).unwrap();
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.payload, Some(Payload::Book(book.clone())));

    let duplicate = create_book(&store, &json(&book), REQ).unwrap();
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert!(duplicate.payload.is_none());

    let deleted = delete_book(&store, "111", REQ);
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.payload.is_none());

    let missing = get_book(&store, "111", REQ).unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_body().unwrap().error, ERROR_BOOK_NOT_FOUND);
}

#[test]
fn list_returns_exactly_the_stored_books() {
    let dir = tempdir().expect("temp dir");
    let store = provisioned_store(dir.path());

    let empty = list_books(&store, REQ).unwrap();
    assert_eq!(empty.payload, Some(Payload::Books(vec![])));

    let books = vec![
        Book::new("1", "One", "X", 2001),
        Book::new("2", "Two", "Y", 2002),
        Book::new("3", "Three", "Z", 2003),
    ];
    for book in &books {
        create_book(&store, &json(book), REQ).unwrap();
    }
    delete_book(&store, "2", REQ);

    let listed = list_books(&store, REQ).unwrap();
    assert_eq!(
        listed.payload,
        Some(Payload::Books(vec![books[0].clone(), books[2].clone()]))
    );
}

#[test]
fn rows_survive_reopening_the_table() {
    let dir = tempdir().expect("temp dir");
    {
        let store = provisioned_store(dir.path());
        create_book(&store, &json(&Book::new("42", "Kept", "K", 1999)), REQ).unwrap();
    }

    let reopened = provisioned_store(dir.path());
    let row = reopened.get_by_key("42").unwrap().expect("row persisted");
    assert_eq!(row.title, "Kept");
    assert!(row.etag.is_some());
}

#[test]
fn deleting_a_missing_book_is_no_content() {
    let dir = tempdir().expect("temp dir");
    let store = provisioned_store(dir.path());
    assert_eq!(delete_book(&store, "never", REQ).status, StatusCode::NO_CONTENT);
}
