//! Converts handler results into HTTP responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bookshelf_lib::{HandlerResponse, Result as LibResult};

use crate::middleware::RequestId;

/// Content type of every JSON body the service writes.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A handler outcome ready to be written to the wire.
///
/// Store failures without a dedicated error payload become a bare 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse(pub HandlerResponse);

impl ServiceResponse {
    /// Wrap a handler result, logging and flattening store failures.
    pub fn from_result(result: LibResult<HandlerResponse>, request_id: &RequestId) -> Self {
        match result {
            Ok(response) => Self(response),
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "store operation failed");
                Self(HandlerResponse::empty(StatusCode::INTERNAL_SERVER_ERROR))
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.0.status
    }
}

impl From<HandlerResponse> for ServiceResponse {
    fn from(response: HandlerResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for ServiceResponse {
    fn into_response(self) -> Response {
        let status = self.0.status;
        match self.0.body_json() {
            Ok(Some(bytes)) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                Body::from(bytes),
            )
                .into_response(),
            Ok(None) => status.into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use bookshelf_lib::test_utils::sample_book;
    use bookshelf_lib::{Error, ErrorBody, Payload};

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn writes_json_payload_with_content_type() {
        let response = ServiceResponse(HandlerResponse::new(
            StatusCode::OK,
            Payload::Book(sample_book()),
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_CONTENT_TYPE
        );
        let value: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(value["isbn"], "111");
    }

    #[tokio::test]
    async fn empty_payload_has_no_body() {
        let response = ServiceResponse(HandlerResponse::empty(StatusCode::NO_CONTENT)).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn store_errors_become_bare_500() {
        let failed = ServiceResponse::from_result(
            Err(Error::StoreUnavailable {
                message: "down".to_string(),
            }),
            &RequestId::new("req-1"),
        );
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = failed.into_response();
        assert!(body_of(response).await.is_empty());
    }

    #[test]
    fn ok_results_pass_through() {
        let inner = HandlerResponse::new(
            StatusCode::NOT_FOUND,
            Payload::Error(ErrorBody::book_not_found()),
        );
        let wrapped = ServiceResponse::from_result(Ok(inner.clone()), &RequestId::new("r"));
        assert_eq!(wrapped, ServiceResponse(inner));
    }
}
