//! Request/response logging middleware.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use http::{Method, StatusCode, Uri};
use std::time::{Duration, Instant};

/// Decides at which level a finished request gets logged.
pub trait RequestLogger {
    /// Log a finished request.
    fn log(method: &Method, uri: &Uri, status: StatusCode, latency: Duration);
}

/// Logs every request at `info`, failed ones at `warn`/`error`.
#[derive(Clone, Copy, Debug)]
pub struct Logger;

impl RequestLogger for Logger {
    fn log(method: &Method, uri: &Uri, status: StatusCode, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(%method, %uri, status = status.as_u16(), latency_ms, "request failed");
        } else if status.is_client_error() {
            tracing::warn!(%method, %uri, status = status.as_u16(), latency_ms, "request rejected");
        } else {
            tracing::info!(%method, %uri, status = status.as_u16(), latency_ms, "request handled");
        }
    }
}

/// Only logs at `debug`. Used for noisy routes like the healthcheck.
#[derive(Clone, Copy, Debug)]
pub struct DebugOnlyLogger;

impl RequestLogger for DebugOnlyLogger {
    fn log(method: &Method, uri: &Uri, status: StatusCode, latency: Duration) {
        tracing::debug!(
            %method,
            %uri,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "request handled"
        );
    }
}

/// Middleware logging method, path, status and latency of each request.
pub async fn log_request_response<L: RequestLogger>(
    req: Request<Body>,
    next: Next<Body>,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    L::log(&method, &uri, response.status(), start.elapsed());

    response
}
