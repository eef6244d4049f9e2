//! Router for the Bookshelf HTTP service.
//!
//! # Endpoints
//!
//! - `GET /book` - List every book
//! - `POST /book` - Create a book
//! - `GET /book/{isbn}` - Fetch one book
//! - `DELETE /book/{isbn}` - Delete one book
//! - `GET /openapi.json` - OpenAPI document for the mounted operations
//! - `GET /metrics` - Prometheus metrics (path configurable)
//! - `GET /health/live`, `GET /health/ready` - Probes
//!
//! Only the book routes require the function key. In read-only mode the
//! write operations are not mounted and answer 405.

use axum::{
    body::Bytes,
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::warn;

use bookshelf_lib::routes::{BOOKS_PATH, BOOK_PATH};
use bookshelf_lib::{handlers, ApiInfo, HandlerResponse, OperationId, Result as LibResult};
use bookshelf_service_shared::{
    health_live, health_ready, metrics_handler, record_book_operation, record_store_failure,
    require_api_key, AppState, MetricsLayer, RequestId, ServiceResponse,
};

/// Path the OpenAPI document is served on.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Metrics path used when the configured one cannot be mounted.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

const HEALTH_LIVE_PATH: &str = "/health/live";
const HEALTH_READY_PATH: &str = "/health/ready";

/// `path` if it can be mounted beside the fixed routes, otherwise
/// [`DEFAULT_METRICS_PATH`].
fn metrics_route(path: &str) -> &str {
    let usable = path.starts_with('/')
        && !path.contains(&['{', '}', '*'][..])
        && path != BOOKS_PATH
        && !path.starts_with("/book/")
        && ![OPENAPI_PATH, HEALTH_LIVE_PATH, HEALTH_READY_PATH].contains(&path);
    if usable {
        return path;
    }
    warn!(
        metrics_path = path,
        fallback = DEFAULT_METRICS_PATH,
        "metrics path clashes with a service route"
    );
    DEFAULT_METRICS_PATH
}

/// Build the service router over `state`.
///
/// A `metrics_path` that overlaps a book, OpenAPI or health route is
/// replaced by [`DEFAULT_METRICS_PATH`].
pub fn app(state: AppState, metrics_path: &str) -> Router {
    let routes = state.routes();

    let mut collection: MethodRouter<AppState> = MethodRouter::new();
    if routes.contains(OperationId::ListBooks) {
        collection = collection.get(list_books);
    }
    if routes.contains(OperationId::CreateBook) {
        collection = collection.post(create_book);
    }

    let mut item: MethodRouter<AppState> = MethodRouter::new();
    if routes.contains(OperationId::GetBook) {
        item = item.get(get_book);
    }
    if routes.contains(OperationId::DeleteBook) {
        item = item.delete(delete_book);
    }

    let books = Router::new()
        .route(BOOKS_PATH, collection)
        .route(BOOK_PATH, item)
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(books)
        .route(OPENAPI_PATH, get(openapi))
        .route(metrics_route(metrics_path), get(metrics_handler))
        .route(HEALTH_LIVE_PATH, get(health_live))
        .route(HEALTH_READY_PATH, get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(MetricsLayer)
        .with_state(state)
}

fn finish(
    operation: OperationId,
    result: LibResult<HandlerResponse>,
    request_id: &RequestId,
) -> ServiceResponse {
    if result.is_err() {
        record_store_failure(operation);
    }
    let response = ServiceResponse::from_result(result, request_id);
    record_book_operation(operation, response.status());
    response
}

async fn list_books(State(state): State<AppState>, request_id: RequestId) -> ServiceResponse {
    let result = handlers::list_books(state.store(), request_id.as_str());
    finish(OperationId::ListBooks, result, &request_id)
}

async fn get_book(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(isbn): Path<String>,
) -> ServiceResponse {
    let result = handlers::get_book(state.store(), &isbn, request_id.as_str());
    finish(OperationId::GetBook, result, &request_id)
}

async fn create_book(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> ServiceResponse {
    let result = handlers::create_book(state.store(), &body, request_id.as_str());
    finish(OperationId::CreateBook, result, &request_id)
}

async fn delete_book(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(isbn): Path<String>,
) -> ServiceResponse {
    let response = handlers::delete_book(state.store(), &isbn, request_id.as_str());
    finish(OperationId::DeleteBook, Ok(response), &request_id)
}

async fn openapi(State(state): State<AppState>) -> Json<Value> {
    Json(state.routes().openapi(&ApiInfo::default()))
}
