//! Liveness check.

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive"),
    )
)]
pub async fn health() -> &'static str {
    "OK"
}
