/// Simulated email endpoints
///
/// # Endpoints
///
/// - `POST /email/send` - Record a simulated send in the log
/// - `GET /email` - The caller's recent log rows, newest first
///
/// Nothing is actually delivered; "sending" is an insert into
/// `email_logs` attributed to the caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::validation_message,
};
use axum::{extract::State, Extension, Json};
use clientele_shared::{
    auth::middleware::AuthContext,
    models::email_log::{CreateEmailLog, EmailLog},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Send email request
#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub to_email: String,

    #[validate(length(min = 1, message = "Required"))]
    pub subject: String,

    pub body: Option<String>,
}

/// Send email response
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub ok: bool,

    /// Id of the new log row
    pub id: i64,
}

/// Record a simulated send
///
/// # Errors
///
/// - `400 Bad Request`: missing or malformed recipient or subject
pub async fn send_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SendEmailRequest>,
) -> ApiResult<Json<SendEmailResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let log = EmailLog::create(
        &state.db,
        CreateEmailLog {
            user_id: auth.user_id,
            to_email: req.to_email,
            subject: req.subject,
            body: req.body,
        },
    )
    .await?;

    Ok(Json(SendEmailResponse { ok: true, id: log.id }))
}

/// The caller's recent email log, newest first (capped at 200 rows)
pub async fn list_emails(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<EmailLog>>> {
    let logs = EmailLog::list_recent(&state.db, auth.user_id).await?;

    Ok(Json(logs))
}
