//! Declarative route table for the book API.
//!
//! The table is the single description of the public surface: hosts use it
//! to dispatch (the Lambda) or to mount routes (the HTTP service), and
//! [`RouteTable::openapi`] renders it as an OpenAPI 3.0 document.

use http::Method;
use serde_json::{json, Map, Value};

/// Collection path.
pub const BOOKS_PATH: &str = "/book";

/// Item path; `{isbn}` is the only path parameter.
pub const BOOK_PATH: &str = "/book/{isbn}";

/// Name of the security scheme in the generated document.
pub const SECURITY_SCHEME: &str = "function_key";

/// Identifies one of the four book operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    ListBooks,
    GetBook,
    CreateBook,
    DeleteBook,
}

impl OperationId {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationId::ListBooks => "listBooks",
            OperationId::GetBook => "getBook",
            OperationId::CreateBook => "createBook",
            OperationId::DeleteBook => "deleteBook",
        }
    }

    /// Whether the operation mutates the store.
    pub fn is_write(self) -> bool {
        matches!(self, OperationId::CreateBook | OperationId::DeleteBook)
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema referenced by a request or response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySchema {
    Book,
    BookList,
    Error,
}

/// One documented response of an operation.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSpec {
    pub status: u16,
    pub description: &'static str,
    pub body: Option<BodySchema>,
}

/// Route metadata for a single operation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,
    pub method: Method,
    pub path: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    /// Description of the `isbn` path parameter, for item routes.
    pub isbn_parameter: Option<&'static str>,
    pub request_body: Option<BodySchema>,
    pub responses: &'static [ResponseSpec],
}

/// Every operation exposed by the API, in documentation order.
pub fn operations() -> [Operation; 4] {
    [
        Operation {
            id: OperationId::ListBooks,
            method: Method::GET,
            path: BOOKS_PATH,
            summary: "List Books",
            description: "Get list of books.",
            isbn_parameter: None,
            request_body: None,
            responses: &[ResponseSpec {
                status: 200,
                description: "All stored books.",
                body: Some(BodySchema::BookList),
            }],
        },
        Operation {
            id: OperationId::GetBook,
            method: Method::GET,
            path: BOOK_PATH,
            summary: "Get Book",
            description: "Get a book by its ISBN.",
            isbn_parameter: Some("ISBN of the requested book"),
            request_body: None,
            responses: &[
                ResponseSpec {
                    status: 200,
                    description: "The requested book.",
                    body: Some(BodySchema::Book),
                },
                ResponseSpec {
                    status: 404,
                    description: "No book exists for the ISBN.",
                    body: Some(BodySchema::Error),
                },
            ],
        },
        Operation {
            id: OperationId::CreateBook,
            method: Method::POST,
            path: BOOKS_PATH,
            summary: "Create Book",
            description: "Create a new book in the backend.",
            isbn_parameter: None,
            request_body: Some(BodySchema::Book),
            responses: &[
                ResponseSpec {
                    status: 200,
                    description: "The created book.",
                    body: Some(BodySchema::Book),
                },
                ResponseSpec {
                    status: 400,
                    description: "Malformed body or ISBN already taken.",
                    body: None,
                },
                ResponseSpec {
                    status: 500,
                    description: "The table transaction failed.",
                    body: Some(BodySchema::Error),
                },
            ],
        },
        Operation {
            id: OperationId::DeleteBook,
            method: Method::DELETE,
            path: BOOK_PATH,
            summary: "Delete Book",
            description: "Delete a book by its ISBN.",
            isbn_parameter: Some("ISBN of the book to delete"),
            request_body: None,
            responses: &[
                ResponseSpec {
                    status: 204,
                    description: "Empty response if successful.",
                    body: None,
                },
                ResponseSpec {
                    status: 500,
                    description: "The deletion failed.",
                    body: Some(BodySchema::Error),
                },
            ],
        },
    ]
}

/// Outcome of resolving a method and path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// A mounted operation, with the `isbn` segment for item routes.
    Found {
        operation: OperationId,
        isbn: Option<String>,
    },
    /// The path exists but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Title, version and optional server URL for the generated document.
#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub server_url: Option<String>,
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            title: "Bookshelf API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            server_url: None,
        }
    }
}

/// The set of mounted operations.
#[derive(Debug, Clone)]
pub struct RouteTable {
    operations: Vec<Operation>,
}

impl RouteTable {
    /// All four operations.
    pub fn full() -> Self {
        Self {
            operations: operations().into(),
        }
    }

    /// Only the read operations; used by the seeded catalogue deployment.
    pub fn read_only() -> Self {
        Self {
            operations: operations()
                .into_iter()
                .filter(|op| !op.id.is_write())
                .collect(),
        }
    }

    pub fn new(read_only: bool) -> Self {
        if read_only {
            Self::read_only()
        } else {
            Self::full()
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn contains(&self, id: OperationId) -> bool {
        self.operations.iter().any(|op| op.id == id)
    }

    /// Resolve a request. Trailing slashes are ignored; the `isbn` segment
    /// is taken verbatim.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch {
        let Some((template, isbn)) = split_path(path) else {
            return RouteMatch::NotFound;
        };

        match self
            .operations
            .iter()
            .find(|op| op.path == template && op.method == *method)
        {
            Some(op) => RouteMatch::Found {
                operation: op.id,
                isbn,
            },
            None => RouteMatch::MethodNotAllowed,
        }
    }

    /// Render the table as an OpenAPI 3.0 document.
    pub fn openapi(&self, info: &ApiInfo) -> Value {
        let mut paths = Map::new();
        for op in &self.operations {
            let entry = paths
                .entry(op.path.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(methods) = entry {
                methods.insert(op.method.as_str().to_lowercase(), operation_document(op));
            }
        }

        let mut document = json!({
            "openapi": "3.0.1",
            "info": {
                "title": info.title,
                "version": info.version,
            },
            "paths": paths,
            "components": {
                "schemas": {
                    "BookModel": book_schema(),
                    "ErrorModel": error_schema(),
                },
                "securitySchemes": {
                    SECURITY_SCHEME: {
                        "type": "apiKey",
                        "name": crate::auth::API_KEY_QUERY_PARAM,
                        "in": "query",
                    },
                },
            },
        });
        if let Some(url) = &info.server_url {
            document["servers"] = json!([{ "url": url }]);
        }
        document
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::full()
    }
}

/// Map a concrete path to its template and `isbn` segment.
fn split_path(path: &str) -> Option<(&'static str, Option<String>)> {
    let trimmed = path.trim_end_matches('/');
    if trimmed == BOOKS_PATH {
        return Some((BOOKS_PATH, None));
    }
    let isbn = trimmed.strip_prefix(BOOKS_PATH)?.strip_prefix('/')?;
    if isbn.is_empty() || isbn.contains('/') {
        return None;
    }
    Some((BOOK_PATH, Some(isbn.to_string())))
}

fn schema_ref(schema: BodySchema) -> Value {
    match schema {
        BodySchema::Book => json!({ "$ref": "#/components/schemas/BookModel" }),
        BodySchema::BookList => json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/BookModel" },
        }),
        BodySchema::Error => json!({ "$ref": "#/components/schemas/ErrorModel" }),
    }
}

fn operation_document(op: &Operation) -> Value {
    let mut responses = Map::new();
    for response in op.responses {
        let mut entry = json!({ "description": response.description });
        if let Some(body) = response.body {
            entry["content"] = json!({ "application/json": { "schema": schema_ref(body) } });
        }
        responses.insert(response.status.to_string(), entry);
    }

    let mut doc = json!({
        "operationId": op.id.as_str(),
        "tags": ["books"],
        "summary": op.summary,
        "description": op.description,
        "security": [{ SECURITY_SCHEME: [] }],
        "responses": responses,
    });
    if let Some(description) = op.isbn_parameter {
        doc["parameters"] = json!([{
            "name": "isbn",
            "in": "path",
            "required": true,
            "description": description,
            "schema": { "type": "string" },
        }]);
    }
    if let Some(body) = op.request_body {
        doc["requestBody"] = json!({
            "required": true,
            "content": { "application/json": { "schema": schema_ref(body) } },
        });
    }
    doc
}

fn book_schema() -> Value {
    json!({
        "type": "object",
        "required": ["isbn", "title", "author", "publishYear"],
        "properties": {
            "isbn": { "type": "string", "description": "Unique ISBN of the book." },
            "title": { "type": "string", "description": "Title of the book." },
            "author": { "type": "string", "description": "Author of the book." },
            "publishYear": { "type": "integer", "format": "int32", "description": "Year of publication." },
        },
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["Error", "ErrorMessage"],
        "properties": {
            "Error": { "type": "string" },
            "ErrorMessage": { "type": "string" },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_collection_and_item_routes() {
        let table = RouteTable::full();
        assert_eq!(
            table.resolve(&Method::GET, "/book"),
            RouteMatch::Found {
                operation: OperationId::ListBooks,
                isbn: None
            }
        );
        assert_eq!(
            table.resolve(&Method::POST, "/book/"),
            RouteMatch::Found {
                operation: OperationId::CreateBook,
                isbn: None
            }
        );
        assert_eq!(
            table.resolve(&Method::DELETE, "/book/111"),
            RouteMatch::Found {
                operation: OperationId::DeleteBook,
                isbn: Some("111".to_string())
            }
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let table = RouteTable::full();
        for path in ["/", "/books", "/book/1/2", "/bookshelf"] {
            assert_eq!(table.resolve(&Method::GET, path), RouteMatch::NotFound, "{path}");
        }
    }

    #[test]
    fn wrong_method_is_not_allowed() {
        let table = RouteTable::full();
        assert_eq!(
            table.resolve(&Method::PUT, "/book/111"),
            RouteMatch::MethodNotAllowed
        );
    }

    #[test]
    fn read_only_table_drops_writes() {
        let table = RouteTable::read_only();
        assert!(table.contains(OperationId::GetBook));
        assert!(!table.contains(OperationId::CreateBook));
        assert_eq!(
            table.resolve(&Method::POST, "/book"),
            RouteMatch::MethodNotAllowed
        );
    }

    #[test]
    fn openapi_document_describes_operations() {
        let doc = RouteTable::full().openapi(&ApiInfo::default());
        assert_eq!(doc["openapi"], "3.0.1");
        assert_eq!(doc["paths"]["/book"]["get"]["operationId"], "listBooks");
        assert_eq!(doc["paths"]["/book"]["post"]["operationId"], "createBook");
        assert_eq!(
            doc["paths"]["/book/{isbn}"]["get"]["parameters"][0]["in"],
            "path"
        );
        assert_eq!(
            doc["paths"]["/book/{isbn}"]["get"]["responses"]["404"]["content"]["application/json"]
                ["schema"]["$ref"],
            "#/components/schemas/ErrorModel"
        );
        assert!(doc["paths"]["/book/{isbn}"]["delete"]["responses"]["204"]
            .get("content")
            .is_none());
        assert_eq!(
            doc["components"]["securitySchemes"]["function_key"]["name"],
            "code"
        );
        assert!(doc.get("servers").is_none());
    }

    #[test]
    fn openapi_read_only_omits_writes_and_sets_server() {
        let info = ApiInfo {
            server_url: Some("https://books.example.com/api".to_string()),
            ..ApiInfo::default()
        };
        let doc = RouteTable::read_only().openapi(&info);
        assert!(doc["paths"]["/book"].get("post").is_none());
        assert!(doc["paths"]["/book/{isbn}"].get("delete").is_none());
        assert_eq!(doc["servers"][0]["url"], "https://books.example.com/api");
    }
}
