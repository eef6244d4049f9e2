//! Routes a proxy event to the matching book handler.

use http::{Method, StatusCode};
use tracing::{error, warn};

use bookshelf_lib::auth::{API_KEY_HEADER, API_KEY_QUERY_PARAM};
use bookshelf_lib::{handlers, is_authorized, HandlerResponse, OperationId, RouteMatch};

use crate::proxy::{ProxyRequest, ProxyResponse};
use crate::runtime::LambdaRuntime;

/// Handle one proxy event.
///
/// Unknown paths answer 404 and unmounted methods 405, both without a body.
/// Authentication is checked only for matched operations.
pub fn dispatch(runtime: &LambdaRuntime, request: &ProxyRequest, request_id: &str) -> ProxyResponse {
    let Ok(method) = Method::from_bytes(request.http_method.as_bytes()) else {
        return ProxyResponse::empty(StatusCode::METHOD_NOT_ALLOWED, request_id);
    };

    let (operation, path_isbn) = match runtime.routes().resolve(&method, &request.path) {
        RouteMatch::Found { operation, isbn } => (operation, isbn),
        RouteMatch::MethodNotAllowed => {
            return ProxyResponse::empty(StatusCode::METHOD_NOT_ALLOWED, request_id)
        }
        RouteMatch::NotFound => return ProxyResponse::empty(StatusCode::NOT_FOUND, request_id),
    };

    if !is_authorized(
        runtime.api_key(),
        request.query_param(API_KEY_QUERY_PARAM),
        request.header(API_KEY_HEADER),
    ) {
        warn!(request_id, operation = %operation, "rejected request without a valid function key");
        return ProxyResponse::empty(StatusCode::UNAUTHORIZED, request_id);
    }

    let isbn = request
        .path_param("isbn")
        .map(str::to_string)
        .or(path_isbn)
        .unwrap_or_default();
    let store = runtime.store();

    let result = match operation {
        OperationId::ListBooks => handlers::list_books(store, request_id),
        OperationId::GetBook => handlers::get_book(store, &isbn, request_id),
        OperationId::CreateBook => match request.body_bytes() {
            Ok(body) => handlers::create_book(store, &body, request_id),
            Err(e) => {
                warn!(request_id, error = %e, "request body is not valid base64");
                Ok(HandlerResponse::empty(StatusCode::BAD_REQUEST))
            }
        },
        OperationId::DeleteBook => Ok(handlers::delete_book(store, &isbn, request_id)),
    };

    match result {
        Ok(response) => to_proxy(&response, request_id),
        Err(e) => {
            error!(request_id, operation = %operation, error = %e, "store operation failed");
            ProxyResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, request_id)
        }
    }
}

fn to_proxy(response: &HandlerResponse, request_id: &str) -> ProxyResponse {
    let body = response
        .body_json()
        .map(|body| body.map(String::from_utf8));

    match body {
        Ok(None) => ProxyResponse::empty(response.status, request_id),
        Ok(Some(Ok(json))) => ProxyResponse::json(response.status, json, request_id),
        Ok(Some(Err(e))) => {
            error!(request_id, error = %e, "response body is not UTF-8");
            ProxyResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, request_id)
        }
        Err(e) => {
            error!(request_id, error = %e, "failed to serialize response body");
            ProxyResponse::empty(StatusCode::INTERNAL_SERVER_ERROR, request_id)
        }
    }
}
