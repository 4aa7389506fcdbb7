//! Logging middleware
//!
//! Records one structured line per API request with latency, and flags
//! slow requests.

use std::time::{Duration, Instant};
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

/// Requests slower than this are logged at warn level
const SLOW_REQUEST: Duration = Duration::from_secs(1);

/// Log method, path, status and duration of every request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let duration = started.elapsed();
    let status = response.status();
    let duration_ms = duration.as_millis() as u64;

    if status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), duration_ms = duration_ms, "Request failed");
    } else if duration > SLOW_REQUEST {
        warn!(method = %method, path = %path, status = status.as_u16(), duration_ms = duration_ms, "Slow request detected");
    } else {
        info!(method = %method, path = %path, status = status.as_u16(), duration_ms = duration_ms, "Request completed");
    }

    response
}
