/// Email log model
///
/// Sends are simulated: a "sent" email is just a row in this table. Rows
/// are attributed to the sending user and listed only back to them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE email_logs (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     to_email VARCHAR(255) NOT NULL,
///     subject VARCHAR(255) NOT NULL,
///     body TEXT,
///     sent_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Cap on the list endpoint — only the most recent rows come back.
pub const RECENT_LIMIT: i64 = 200;

/// An email log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailLog {
    pub id: i64,

    /// Sending user
    pub user_id: i64,

    pub to_email: String,

    pub subject: String,

    pub body: Option<String>,

    pub sent_at: DateTime<Utc>,
}

/// Input for recording a simulated send
#[derive(Debug, Clone)]
pub struct CreateEmailLog {
    pub user_id: i64,
    pub to_email: String,
    pub subject: String,
    pub body: Option<String>,
}

impl EmailLog {
    /// Records a simulated send.
    pub async fn create(pool: &PgPool, data: CreateEmailLog) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, EmailLog>(
            r#"
            INSERT INTO email_logs (user_id, to_email, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, to_email, subject, body, sent_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.to_email)
        .bind(data.subject)
        .bind(data.body)
        .fetch_one(pool)
        .await
    }

    /// The sender's most recent log rows, newest first, capped at
    /// [`RECENT_LIMIT`].
    pub async fn list_recent(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, EmailLog>(
            r#"
            SELECT id, user_id, to_email, subject, body, sent_at
            FROM email_logs
            WHERE user_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_LIMIT)
        .fetch_all(pool)
        .await
    }
}
