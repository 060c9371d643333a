/// Task endpoints
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task, optionally linked to a contact
/// - `GET /tasks` - List the caller's tasks, newest first
/// - `GET /tasks/:id` - Single task
/// - `PUT /tasks/:id` - Partial update (absent fields unchanged)
/// - `DELETE /tasks/:id` - Delete
///
/// A task's contact link is validated against the caller before every
/// write that sets it: pointing a task at another user's contact fails
/// with `Invalid contact` no matter whether that contact exists.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::validation_message,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use clientele_shared::{
    auth::middleware::AuthContext,
    models::{
        contact::Contact,
        task::{CreateTask, Task, TaskWithContact, UpdateTask},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Required"))]
    pub title: String,

    pub description: Option<String>,

    /// Defaults to "pending"
    pub status: Option<String>,

    pub due_date: Option<NaiveDate>,

    /// Must reference one of the caller's contacts when present
    pub contact_id: Option<i64>,
}

/// Create task response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub ok: bool,
    pub task_id: i64,
}

/// Generic mutation acknowledgement
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Create a task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: missing title, or `contact_id` does not reference
///   one of the caller's contacts
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<CreateTaskResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    if let Some(contact_id) = req.contact_id {
        if !Contact::exists_scoped(&state.db, contact_id, auth.user_id).await? {
            return Err(ApiError::InvalidReference("Invalid contact".to_string()));
        }
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: auth.user_id,
            contact_id: req.contact_id,
            title: req.title,
            description: req.description,
            status: req.status,
            due_date: req.due_date,
        },
    )
    .await?;

    Ok(Json(CreateTaskResponse {
        ok: true,
        task_id: task.id,
    }))
}

/// List the caller's tasks, newest first, with contact names joined in
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskWithContact>>> {
    let tasks = Task::list_by_owner(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// Single task, scoped
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_scoped(&state.db, id, auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// Partial update
///
/// Absent fields keep their stored values; explicit nulls clear the
/// nullable ones. Sending only `{"status": "completed"}` flips the status
/// and leaves title, description, due date, and contact link untouched.
///
/// # Errors
///
/// - `404 Not Found`: id absent or owned by another user
/// - `400 Bad Request`: merged contact link is not the caller's
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateTask>,
) -> ApiResult<Json<OkResponse>> {
    let existing = Task::find_scoped(&state.db, id, auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let values = patch.merge_into(&existing);

    // The merged link is re-verified even when the patch did not touch it.
    if let Some(contact_id) = values.contact_id {
        if !Contact::exists_scoped(&state.db, contact_id, auth.user_id).await? {
            return Err(ApiError::InvalidReference("Invalid contact".to_string()));
        }
    }

    Task::update_scoped(&state.db, id, auth.user_id, values)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(OkResponse { ok: true }))
}

/// Scoped delete
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OkResponse>> {
    let deleted = Task::delete_scoped(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(Json(OkResponse { ok: true }))
}
