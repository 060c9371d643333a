/// Error taxonomy for the API server
///
/// Handlers return `Result<T, ApiError>`; every failure a caller can see
/// maps to one of these variants and renders as a JSON body with a single
/// human-readable `error` field.
///
/// Two rules hold everywhere:
/// - A scoped lookup that matches nothing is `NotFound` whether the row is
///   absent or belongs to someone else.
/// - Storage-layer detail never reaches the caller; unexpected failures
///   are logged server-side and surface as a generic 500.
///
/// # Example
///
/// ```no_run
/// use clientele_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use clientele_shared::auth::{jwt::JwtError, middleware::AuthError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400)
    Validation(String),

    /// Missing, invalid, or expired bearer token (401)
    Unauthenticated(String),

    /// Login failure; deliberately silent about whether the identifier or
    /// the password was wrong (400)
    InvalidCredentials,

    /// Referenced entity is nonexistent or belongs to another user (400)
    InvalidReference(String),

    /// Unique-constraint violation (409)
    Conflict(String),

    /// Row absent or not owned — indistinguishable by design (404)
    NotFound,

    /// Unexpected failure; detail logged, withheld from caller (500)
    Internal(String),
}

/// Error response body: a single human-readable message
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::InvalidCredentials => {
                // One message for both unknown identifier and wrong
                // password: login failures must not be enumerable.
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            ApiError::InvalidReference(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Translates storage-layer failures into the taxonomy.
///
/// Unique-constraint violations become `Conflict` — the database is the
/// arbiter of uniqueness races, not application code.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("email") || constraint.contains("phone") {
                        return ApiError::Conflict("Email or phone already used".to_string());
                    }
                    if constraint.contains("number") {
                        return ApiError::Conflict(
                            "Contact number already exists for this user".to_string(),
                        );
                    }
                    return ApiError::Conflict("Duplicate value".to_string());
                }

                if db_err.is_foreign_key_violation() {
                    return ApiError::InvalidReference("Invalid reference".to_string());
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::Internal(msg),
            JwtError::Expired => ApiError::Unauthenticated("Token has expired".to_string()),
            _ => ApiError::Unauthenticated("Invalid or expired token".to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Validation("Missing fields".to_string());
        assert_eq!(err.to_string(), "Validation failed: Missing fields");

        assert_eq!(ApiError::NotFound.to_string(), "Not found");
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::Validation("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Unauthenticated("x".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (
                ApiError::InvalidReference("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Conflict("x".to_string()), StatusCode::CONFLICT),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (
                ApiError::Internal("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_detail_is_withheld() {
        let response =
            ApiError::Internal("connection refused at 10.0.0.3:5432".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is rebuilt from a constant; the detail only goes to the log.
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound));
    }
}
