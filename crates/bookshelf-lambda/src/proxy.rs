//! API Gateway REST proxy event and response shapes.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Incoming API Gateway proxy event. Fields the function does not use are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
}

impl ProxyRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Raw request body, base64-decoded when API Gateway encoded it.
    pub fn body_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match &self.body {
            None => Ok(Vec::new()),
            Some(body) if self.is_base64_encoded.unwrap_or(false) => STANDARD.decode(body),
            Some(body) => Ok(body.clone().into_bytes()),
        }
    }
}

/// Proxy integration response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// Response with no body.
    pub fn empty(status: StatusCode, request_id: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), request_id.to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    /// Response carrying a JSON body.
    pub fn json(status: StatusCode, body: String, request_id: &str) -> Self {
        let mut response = Self::empty(status, request_id);
        response.headers.insert(
            "content-type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        response.body = body;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_api_gateway_event() {
        let event = json!({
            "resource": "/book/{isbn}",
            "path": "/book/111",
            "httpMethod": "GET",
            "headers": {"X-Functions-Key": "k"},
            "queryStringParameters": null,
            "pathParameters": {"isbn": "111"},
            "body": null,
            "isBase64Encoded": false,
            "requestContext": {"requestId": "abc"}
        });
        let request: ProxyRequest = serde_json::from_value(event).unwrap();
        assert_eq!(request.http_method, "GET");
        assert_eq!(request.path_param("isbn"), Some("111"));
        assert_eq!(request.header("x-functions-key"), Some("k"));
        assert_eq!(request.query_param("code"), None);
        assert!(request.body_bytes().unwrap().is_empty());
    }

    #[test]
    fn decodes_base64_bodies() {
        let request = ProxyRequest {
            body: Some(STANDARD.encode(br#"{"isbn":"1"}"#)),
            is_base64_encoded: Some(true),
            ..ProxyRequest::default()
        };
        assert_eq!(request.body_bytes().unwrap(), br#"{"isbn":"1"}"#.to_vec());

        let broken = ProxyRequest {
            body: Some("!!!".to_string()),
            is_base64_encoded: Some(true),
            ..ProxyRequest::default()
        };
        assert!(broken.body_bytes().is_err());
    }

    #[test]
    fn response_serializes_in_proxy_shape() {
        let response = ProxyResponse::json(StatusCode::OK, "[]".to_string(), "req-1");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"], "[]");
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["headers"]["x-request-id"], "req-1");
    }
}
