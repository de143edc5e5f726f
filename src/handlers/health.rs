//! Health check endpoint for service monitoring.

/// Liveness check handler.
///
/// # Endpoint
///
/// `GET /health`
///
/// Answers a plain `200 "OK"` with no store dependency, so load balancers
/// can probe the process before the database is reachable.
pub async fn health_check() -> &'static str {
    "OK"
}
