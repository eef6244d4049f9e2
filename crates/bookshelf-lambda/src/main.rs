//! AWS Lambda entry point for the Bookshelf API.

use http::StatusCode;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use bookshelf_lambda::{dispatch, init_runtime, init_tracing, LambdaRuntime, ProxyRequest, ProxyResponse};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let runtime = init_runtime()?;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| handler(runtime, event))).await
}

async fn handler(runtime: &'static LambdaRuntime, event: LambdaEvent<Value>) -> Result<ProxyResponse, Error> {
    let request_id = event.context.request_id.clone();

    let request: ProxyRequest = match serde_json::from_value(event.payload) {
        Ok(req) => req,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to parse proxy event");
            return Ok(ProxyResponse::empty(StatusCode::BAD_REQUEST, &request_id));
        }
    };

    info!(
        request_id = %request_id,
        method = %request.http_method,
        path = %request.path,
        "handling request"
    );

    let response = dispatch(runtime, &request, &request_id);

    info!(request_id = %request_id, status = response.status_code, "request completed");
    Ok(response)
}
