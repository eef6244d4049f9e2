//! Function-key guard for the book routes.

use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use bookshelf_lib::auth::{API_KEY_HEADER, API_KEY_QUERY_PARAM};
use bookshelf_lib::is_authorized;

use crate::middleware::RequestId;
use crate::AppState;

/// Reject requests that do not carry the configured function key.
///
/// Install with `axum::middleware::from_fn_with_state` as a route layer so
/// health, metrics and the OpenAPI document stay public. Rejections are a
/// bare 401.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = {
        let query = Query::<HashMap<String, String>>::try_from_uri(request.uri()).ok();
        let query_key = query
            .as_ref()
            .and_then(|Query(params)| params.get(API_KEY_QUERY_PARAM))
            .map(String::as_str);
        let header_key = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        is_authorized(state.api_key(), query_key, header_key)
    };

    if authorized {
        return next.run(request).await;
    }

    let request_id = request.extensions().get::<RequestId>().cloned();
    tracing::warn!(
        request_id = request_id.as_ref().map(RequestId::as_str).unwrap_or("-"),
        path = %request.uri().path(),
        "rejected request without a valid function key"
    );
    StatusCode::UNAUTHORIZED.into_response()
}
