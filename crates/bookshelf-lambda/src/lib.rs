//! AWS Lambda function serving the Bookshelf API.
//!
//! API Gateway invokes the function with REST proxy events. Each event is
//! resolved against the route table and handed to the matching
//! `bookshelf-lib` handler; the store is opened once per execution
//! environment by [`init_runtime`].

#![deny(warnings)]

mod dispatch;
mod proxy;
mod runtime;
mod tracing_init;

pub use dispatch::dispatch;
pub use proxy::{ProxyRequest, ProxyResponse};
pub use runtime::{init_runtime, InitError, LambdaConfig, LambdaRuntime};
pub use tracing_init::init_tracing;
