/// Task model and ownership-scoped operations
///
/// Tasks are owned directly by a user and may optionally reference one of
/// that user's contacts. The contact link is validated against the
/// principal before every write that sets it — a task can never point at
/// someone else's contact.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     contact_id BIGINT REFERENCES contacts(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(50) NOT NULL DEFAULT 'pending',
///     due_date DATE,
///     created_by BIGINT,
///     updated_by BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const TASK_COLUMNS: &str = "id, user_id, contact_id, title, description, status, due_date, \
                            created_by, updated_by, created_at, updated_at";

/// A task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Optional link to one of the owner's contacts
    pub contact_id: Option<i64>,

    pub title: String,

    pub description: Option<String>,

    /// Free-text status, defaults to "pending"
    pub status: String,

    pub due_date: Option<NaiveDate>,

    pub created_by: Option<i64>,

    pub updated_by: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A task joined with its contact's denormalized full name, for the list
/// endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskWithContact {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,

    /// `full_name` of the linked contact, when there is one
    pub contact_name: Option<String>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_id: i64,
    pub contact_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to "pending" when absent
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update for a task
///
/// Absent fields keep their stored value; an explicit JSON `null` clears a
/// nullable field (description, due date, contact link). This is the
/// formalized shape of the fetch-then-overlay update: sending only
/// `{"status": "completed"}` flips the status and touches nothing else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub contact_id: Option<Option<i64>>,
}

/// Fully merged column values ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct TaskValues {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub contact_id: Option<i64>,
}

impl UpdateTask {
    /// Overlays this patch on an existing row.
    ///
    /// The caller re-verifies the merged `contact_id` against the
    /// principal before writing.
    pub fn merge_into(self, existing: &Task) -> TaskValues {
        TaskValues {
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            status: self.status.unwrap_or_else(|| existing.status.clone()),
            due_date: self.due_date.unwrap_or(existing.due_date),
            contact_id: self.contact_id.unwrap_or(existing.contact_id),
        }
    }
}

impl Task {
    /// Inserts a task attributed to its owner.
    ///
    /// The contact link, when present, must already have been verified as
    /// the principal's.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, contact_id, title, description, status, due_date,
                               created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $1, $1)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.contact_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_else(|| "pending".to_string()))
        .bind(data.due_date)
        .fetch_one(pool)
        .await
    }

    /// Lists a user's tasks, newest first, each with its contact's name
    /// from the denormalized `full_name` column.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<TaskWithContact>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithContact>(
            r#"
            SELECT t.id, t.user_id, t.contact_id, t.title, t.description, t.status,
                   t.due_date, t.created_by, t.updated_by, t.created_at, t.updated_at,
                   c.full_name AS contact_name
            FROM tasks t
            LEFT JOIN contacts c ON c.id = t.contact_id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Scoped lookup: `None` whether the row is absent or foreign-owned.
    pub async fn find_scoped(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Writes merged values back, scoped by `(id, user_id)`.
    pub async fn update_scoped(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        values: TaskValues,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, status = $3, due_date = $4, contact_id = $5,
                updated_by = $7, updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(values.title)
        .bind(values.description)
        .bind(values.status)
        .bind(values.due_date)
        .bind(values.contact_id)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Scoped delete.
    pub async fn delete_scoped(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches all tasks linked to the given contacts in one query, for
    /// in-memory grouping under their parents.
    pub async fn list_by_contacts(
        pool: &PgPool,
        contact_ids: &[i64],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE contact_id = ANY($1) ORDER BY id",
        ))
        .bind(contact_ids)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 9,
            user_id: 1,
            contact_id: Some(4),
            title: "Call Jane".to_string(),
            description: Some("quarterly check-in".to_string()),
            status: "pending".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            created_by: Some(1),
            updated_by: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_only_patch_preserves_everything_else() {
        let existing = sample_task();
        let patch: UpdateTask = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();

        let merged = patch.merge_into(&existing);

        assert_eq!(merged.status, "completed");
        assert_eq!(merged.title, "Call Jane");
        assert_eq!(merged.description, Some("quarterly check-in".to_string()));
        assert_eq!(merged.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(merged.contact_id, Some(4));
    }

    #[test]
    fn test_explicit_null_unlinks_contact() {
        let existing = sample_task();
        let patch: UpdateTask = serde_json::from_str(r#"{"contact_id": null}"#).unwrap();

        assert_eq!(patch.contact_id, Some(None));

        let merged = patch.merge_into(&existing);
        assert_eq!(merged.contact_id, None);
        assert_eq!(merged.title, "Call Jane");
    }

    #[test]
    fn test_absent_nullable_fields_stay_put() {
        let existing = sample_task();
        let patch: UpdateTask = serde_json::from_str(r#"{"title": "Call Janet"}"#).unwrap();

        assert_eq!(patch.description, None);
        assert_eq!(patch.due_date, None);

        let merged = patch.merge_into(&existing);
        assert_eq!(merged.title, "Call Janet");
        assert_eq!(merged.description, Some("quarterly check-in".to_string()));
        assert_eq!(merged.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let existing = sample_task();
        let patch: UpdateTask = serde_json::from_str("{}").unwrap();

        let merged = patch.merge_into(&existing);

        assert_eq!(merged.title, existing.title);
        assert_eq!(merged.description, existing.description);
        assert_eq!(merged.status, existing.status);
        assert_eq!(merged.due_date, existing.due_date);
        assert_eq!(merged.contact_id, existing.contact_id);
    }
}
