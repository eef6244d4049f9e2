//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok", or "not_ready: <reason>".
    pub status: String,
    pub service: String,
    pub version: String,

    /// Store backend name (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Backing table name (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            backend: None,
            table: None,
        }
    }

    pub fn ready(service: &str, version: &str, backend: &str, table: &str) -> Self {
        Self {
            backend: Some(backend.to_string()),
            table: Some(table.to_string()),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`: 200 whenever the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: 200 when the book table exists, 503 otherwise.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    let store = state.store();

    match store.table_exists() {
        Ok(true) => {
            let status = HealthStatus::ready(service, version, store.backend(), store.table_name());
            (StatusCode::OK, Json(status)).into_response()
        }
        Ok(false) => {
            let status = HealthStatus::not_ready(service, version, "book table missing");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            let status = HealthStatus::not_ready(service, version, "book store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
