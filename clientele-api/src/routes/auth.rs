/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Create a credential record
/// - `POST /auth/login` - Verify credentials and issue a session token
///
/// These are the only routes outside the auth gate.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::validation_message,
};
use axum::{extract::State, Json};
use clientele_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 7, max = 32, message = "Must be 7-32 characters"))]
    pub phone: String,

    #[validate(length(min = 6, message = "Must be at least 6 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub ok: bool,

    /// Id of the newly created user
    pub user_id: i64,
}

/// Login request
///
/// The identifier field accepts an email address or a phone number.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(rename = "emailOrPhone")]
    #[validate(length(min = 1, message = "Required"))]
    pub email_or_phone: String,

    #[validate(length(min = 1, message = "Required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed session token
    pub token: String,

    /// Seconds until the token expires; clients arm their sign-out timer
    /// from this, but the server re-verifies every request regardless.
    pub expires_in_seconds: i64,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "email": "ada@example.com",
///   "phone": "1111111111",
///   "password": "secret123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or malformed fields
/// - `409 Conflict`: email or phone already registered — pre-checked, and
///   the unique constraints decide races the pre-check cannot see
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    if User::identity_taken(&state.db, &req.email, &req.phone).await? {
        return Err(ApiError::Conflict("Email or phone already used".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent duplicate slips past the pre-check and lands on the
    // unique constraint; From<sqlx::Error> turns that into Conflict.
    let user = User::create(
        &state.db,
        CreateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(RegisterResponse {
        ok: true,
        user_id: user.id,
    }))
}

/// Login and issue a session token
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "emailOrPhone": "ada@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ...", "expiresInSeconds": 900 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing credentials, or invalid credentials — the
///   latter with one fixed message whether the identifier is unknown or
///   the password is wrong
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let user = User::find_by_identifier(&state.db, &req.email_or_phone)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(user.id, state.token_ttl());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::debug!(user_id = user.id, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        expires_in_seconds: claims.expires_in_seconds(),
    }))
}
