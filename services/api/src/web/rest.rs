//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use recruit_core::domain::{ContactMessage, InterviewMode, Slot};
use recruit_core::schedule::{upcoming_slots, BOOKING_WINDOW_DAYS};
use recruit_core::submission::SubmissionOutcome;
use recruit_core::validation::validate_contact_message;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

pub const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_resume_handler,
        contact_handler,
        list_slots_handler,
    ),
    components(
        schemas(UploadResumeResponse, ContactResponse, ContactMessage, SlotResponse, ErrorResponse)
    ),
    tags(
        (name = "Recruitment API", description = "API endpoints for the team's application wizard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct UploadResumeResponse {
    file_ref: String,
}

#[derive(Serialize, ToSchema)]
pub struct ContactResponse {
    success: bool,
    message: String,
    id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SlotResponse {
    date: NaiveDate,
    time: String,
    available: bool,
    /// "online" or "offline".
    mode: String,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            date: slot.date,
            time: slot.time,
            available: slot.available,
            mode: match slot.mode {
                InterviewMode::Online => "online".to_string(),
                InterviewMode::Offline => "offline".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub details: Option<BTreeMap<String, Vec<String>>>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
            details: None,
        }),
    )
}

/// Checks an upload against the size limit and the accepted document types.
pub fn check_resume(
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), (StatusCode, String)> {
    if size == 0 {
        return Err((StatusCode::BAD_REQUEST, "The uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Resume must be at most {} bytes", max_bytes),
        ));
    }
    if !ALLOWED_RESUME_TYPES.contains(&content_type) {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Resume must be a PDF or Word document".to_string(),
        ));
    }
    Ok(())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a resume for the third wizard step.
///
/// Accepts a multipart/form-data request with a single file part and returns
/// the opaque reference to attach through the wizard connection.
#[utoipa::path(
    post,
    path = "/resumes",
    request_body(content_type = "multipart/form-data", description = "The resume to upload."),
    responses(
        (status = 201, description = "Resume stored", body = UploadResumeResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_resume_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("Failed to read multipart data: {}", e)))?
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Multipart form must include a file"))?;

    let file_name = field.file_name().unwrap_or("resume").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(|e| {
        reject(
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    check_resume(&content_type, data.len(), app_state.config.max_resume_bytes)
        .map_err(|(status, message)| reject(status, message))?;

    match app_state
        .persistence
        .store_resume(&file_name, &content_type, &data)
        .await
    {
        Ok(file_ref) => {
            info!("Stored resume '{}' as {}", file_name, file_ref.0);
            Ok((
                StatusCode::CREATED,
                Json(UploadResumeResponse { file_ref: file_ref.0 }),
            ))
        }
        Err(e) => {
            error!("Failed to store resume: {:?}", e);
            Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store resume",
            ))
        }
    }
}

/// Send a message through the public contact form.
///
/// Email delivery is best effort: once the message is saved the sender always
/// gets a success response.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactMessage,
    responses(
        (status = 200, description = "Message received", body = ContactResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "The message could not be saved", body = ErrorResponse)
    )
)]
pub async fn contact_handler(
    State(app_state): State<Arc<AppState>>,
    Json(message): Json<ContactMessage>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(errors) = validate_contact_message(&message) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                message: "Validation failed".to_string(),
                details: Some(errors),
            }),
        ));
    }

    match app_state.submitter.submit_contact_message(&message).await {
        SubmissionOutcome::Submitted { id } => Ok(Json(ContactResponse {
            success: true,
            message: recruit_core::submission::CONTACT_RECEIVED_MESSAGE.to_string(),
            id,
        })),
        SubmissionOutcome::Received { message } => Ok(Json(ContactResponse {
            success: true,
            message,
            id: None,
        })),
        SubmissionOutcome::Failed { message } => {
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
    }
}

/// Interview slots for the coming week.
#[utoipa::path(
    get,
    path = "/slots",
    responses(
        (status = 200, description = "Bookable interview slots", body = [SlotResponse])
    )
)]
pub async fn list_slots_handler() -> Json<Vec<SlotResponse>> {
    let today = Utc::now().date_naive();
    Json(
        upcoming_slots(today, BOOKING_WINDOW_DAYS)
            .into_iter()
            .map(SlotResponse::from)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_checks() {
        let max = 1024;
        assert!(check_resume("application/pdf", 10, max).is_ok());
        assert_eq!(
            check_resume("application/pdf", 0, max).unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            check_resume("application/pdf", 2048, max).unwrap_err().0,
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            check_resume("image/png", 10, max).unwrap_err().0,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn slot_response_uses_lowercase_mode() {
        let slot = Slot {
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            time: "10:00".into(),
            available: true,
            mode: InterviewMode::Offline,
        };
        let json = serde_json::to_value(SlotResponse::from(slot)).unwrap();
        assert_eq!(json["mode"], "offline");
        assert_eq!(json["date"], "2026-10-19");
    }

    #[test]
    fn contact_body_is_documented_from_the_domain_type() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("ContactMessage"));
        assert!(!schemas.contains_key("ContactMessageBody"));
        assert!(doc.paths.paths.contains_key("/contact"));
    }

    #[tokio::test]
    async fn slots_cover_a_week() {
        let Json(slots) = list_slots_handler().await;
        assert_eq!(slots.len(), BOOKING_WINDOW_DAYS * 6);
    }
}
