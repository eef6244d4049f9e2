//! Shared infrastructure for the Bookshelf HTTP service.
//!
//! - [`AppState`]: the injected book store, function key and route table
//! - [`ServiceConfig`]: environment-driven configuration
//! - [`health`]: liveness and readiness handlers
//! - [`ServiceResponse`]: writes a handler outcome to the wire
//! - [`require_api_key`]: function-key guard for the book routes
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: structured logging setup
//! - [`middleware`]: request tracking and metrics middleware
//!
//! # Architecture
//!
//! Handlers stay thin. All book behavior lives in `bookshelf-lib`; this crate
//! provides only HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Extract path, body and request ID                        │
//! │  - Call the bookshelf-lib handler                           │
//! │  - Record metrics                                           │
//! │  - Write the ServiceResponse                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature to access [`test_utils`] from dependent
//! crates.

#![deny(warnings)]

mod auth;
pub mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::require_api_key;
pub use config::{ConfigError, ServiceConfig, StoreBackend};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_book_operation, record_store_failure, MetricsConfig,
    MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use response::{ServiceResponse, JSON_CONTENT_TYPE};
pub use state::{AppState, AppStateError};
