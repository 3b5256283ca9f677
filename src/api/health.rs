use crate::api::schemas::health::HealthResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Liveness probe: returns 200 OK with the current server time as long as the process is running.
pub async fn health() -> impl IntoResponse {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    (StatusCode::OK, Json(HealthResponse { status: "OK".to_string(), timestamp }))
}
