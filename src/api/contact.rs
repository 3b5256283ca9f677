use crate::api::AppState;
use crate::api::schemas::contact::{ContactData, ContactResponse};
use crate::domain::submission::RawSubmission;
use crate::error::{AppError, Result};
use crate::services::validator::raw_from_json;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use time::format_description::well_known::Rfc3339;

/// Accepts a contact-form submission and relays it to the configured channels.
///
/// # Errors
/// Returns `AppError::BadRequest` if the body is not a JSON object or fails validation.
/// Returns `AppError::DeliveryFailed` if the primary channel could not deliver it.
pub async fn submit(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let raw = parse_body(&body)?;

    let (submission, aggregate) = state.submission_service.submit(&raw).await?;

    if !aggregate.overall_success {
        return Err(AppError::DeliveryFailed {
            message: format!("Failed to send message via {}", aggregate.primary),
            channels: aggregate.per_channel,
        });
    }

    let response = ContactResponse {
        success: true,
        message: "Message sent successfully!".to_string(),
        data: ContactData {
            name: submission.name.clone(),
            email: submission.email.clone(),
            timestamp: submission.submitted_at.format(&Rfc3339).map_err(|_| AppError::Internal)?,
        },
        channels: aggregate.per_channel,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// CORS preflight; the headers themselves are added by the router.
pub async fn preflight() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn parse_body(body: &[u8]) -> Result<RawSubmission> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let serde_json::Value::Object(object) = value else {
        return Err(AppError::BadRequest("Request body must be a JSON object".to_string()));
    };

    Ok(raw_from_json(object)?)
}
