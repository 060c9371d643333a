/// Contact endpoints
///
/// # Endpoints
///
/// - `POST /contacts` - Create a contact
/// - `GET /contacts` - List the caller's contacts with nested children
/// - `GET /contacts/:id` - Single contact with nested children
/// - `PUT /contacts/:id` - Partial update (absent fields unchanged)
/// - `DELETE /contacts/:id` - Delete (children cascade)
/// - `POST /contacts/:id/address` - Add an address under a contact
///
/// Every operation is scoped to the authenticated principal; a contact id
/// that exists under another user reads as `Not found`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::validation_message,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use clientele_shared::{
    auth::middleware::AuthContext,
    models::{
        address::{Address, CreateAddress},
        contact::{Contact, ContactWithChildren, CreateContact, UpdateContact},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create contact request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, message = "Required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Required"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "Required"))]
    pub number: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub note: Option<String>,
}

/// Create contact response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactResponse {
    pub ok: bool,
    pub contact_id: i64,
}

/// Generic mutation acknowledgement
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Add address under a contact: request body
#[derive(Debug, Deserialize, Validate)]
pub struct AddContactAddressRequest {
    #[validate(length(min = 1, message = "Required"))]
    pub line1: String,

    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

/// Add address response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAddressResponse {
    pub ok: bool,
    pub address_id: i64,
}

/// Create a contact owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: missing first name, last name, or number
/// - `409 Conflict`: the caller already has a contact with this number
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<CreateContactResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let contact = Contact::create(
        &state.db,
        CreateContact {
            user_id: auth.user_id,
            first_name: req.first_name,
            last_name: req.last_name,
            number: req.number,
            email: req.email,
            note: req.note,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateContactResponse {
            ok: true,
            contact_id: contact.id,
        }),
    ))
}

/// List the caller's contacts with nested addresses and tasks
///
/// Children are fetched in two batched queries and grouped in memory —
/// no per-contact follow-up calls, every child under exactly one parent.
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ContactWithChildren>>> {
    let contacts = Contact::list_with_children(&state.db, auth.user_id).await?;

    Ok(Json(contacts))
}

/// Single contact with nested children
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContactWithChildren>> {
    let contact = Contact::find_with_children(&state.db, id, auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(contact))
}

/// Partial update: absent fields keep their stored values
///
/// # Errors
///
/// - `404 Not Found`: id absent or owned by another user
/// - `409 Conflict`: new number collides with another of the caller's contacts
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateContact>,
) -> ApiResult<Json<OkResponse>> {
    let existing = Contact::find_scoped(&state.db, id, auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let values = patch.merge_into(&existing);

    Contact::update_scoped(&state.db, id, auth.user_id, values)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(OkResponse { ok: true }))
}

/// Scoped delete; the contact's addresses and tasks cascade
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OkResponse>> {
    let deleted = Contact::delete_scoped(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(Json(OkResponse { ok: true }))
}

/// Add an address under one of the caller's contacts
///
/// # Errors
///
/// - `400 Bad Request`: missing line1, or the contact does not belong to
///   the caller (`Invalid contact`)
pub async fn add_contact_address(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<AddContactAddressRequest>,
) -> ApiResult<Json<AddAddressResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    // Ownership chain check before the write.
    if !Contact::exists_scoped(&state.db, id, auth.user_id).await? {
        return Err(ApiError::InvalidReference("Invalid contact".to_string()));
    }

    let address = Address::create(
        &state.db,
        CreateAddress {
            contact_id: id,
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            country: req.country,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok(Json(AddAddressResponse {
        ok: true,
        address_id: address.id,
    }))
}
