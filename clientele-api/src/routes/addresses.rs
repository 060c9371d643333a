/// Standalone address endpoint
///
/// # Endpoints
///
/// - `POST /addresses` - Create an address for one of the caller's contacts
///
/// Unlike the nested `/contacts/:id/address` route this one takes the
/// contact id in the body, but the ownership check is identical: the
/// referenced contact must belong to the caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::validation_message,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use clientele_shared::{
    auth::middleware::AuthContext,
    models::{
        address::{Address, CreateAddress},
        contact::Contact,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create address request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    pub contact_id: i64,

    #[validate(length(min = 1, message = "Required"))]
    pub line1: String,

    pub line2: Option<String>,

    #[validate(length(min = 1, message = "Required"))]
    pub city: String,

    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
}

/// Create address response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressResponse {
    pub ok: bool,
    pub address_id: i64,
}

/// Create an address under one of the caller's contacts
///
/// # Errors
///
/// - `400 Bad Request`: missing line1 or city, or the contact does not
///   belong to the caller (`Invalid contact`)
pub async fn create_address(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAddressRequest>,
) -> ApiResult<(StatusCode, Json<CreateAddressResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    if !Contact::exists_scoped(&state.db, req.contact_id, auth.user_id).await? {
        return Err(ApiError::InvalidReference("Invalid contact".to_string()));
    }

    let address = Address::create(
        &state.db,
        CreateAddress {
            contact_id: req.contact_id,
            line1: req.line1,
            line2: req.line2,
            city: Some(req.city),
            state: req.state,
            pincode: req.pincode,
            country: req.country,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAddressResponse {
            ok: true,
            address_id: address.id,
        }),
    ))
}
