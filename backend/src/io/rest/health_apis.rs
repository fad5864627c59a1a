use axum::response::Json;
use shared::HealthResponse;

/// Liveness check, no authentication required
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
