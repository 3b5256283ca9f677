use crate::domain::delivery::DeliveryResult;
use crate::services::validator::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Delivery failed: {message}")]
    DeliveryFailed { message: String, channels: Vec<DeliveryResult> },
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::MethodNotAllowed => {
                tracing::debug!("Method not allowed");
                (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method not allowed" }))).into_response()
            }
            Self::DeliveryFailed { message, channels } => {
                tracing::warn!(message = %message, "Primary delivery failed");
                let body = json!({
                    "success": false,
                    "error": message,
                    "channels": channels,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "success": false, "error": "Internal server error" })))
                    .into_response()
            }
        }
    }
}
