/// Address model
///
/// Addresses have no owner column of their own — ownership is transitive
/// through the contact they belong to, so every write is preceded by a
/// scoped check that the contact belongs to the requesting user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE addresses (
///     id BIGSERIAL PRIMARY KEY,
///     contact_id BIGINT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
///     line1 VARCHAR(255) NOT NULL,
///     line2 VARCHAR(255),
///     city VARCHAR(100),
///     state VARCHAR(100),
///     pincode VARCHAR(20),
///     country VARCHAR(100),
///     created_by BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// An address row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,

    /// Parent contact; the ownership chain runs through it
    pub contact_id: i64,

    pub line1: String,

    pub line2: Option<String>,

    pub city: Option<String>,

    pub state: Option<String>,

    pub pincode: Option<String>,

    pub country: Option<String>,

    pub created_by: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating an address
///
/// `created_by` is the authenticated principal; the contact must already
/// have been verified as theirs.
#[derive(Debug, Clone)]
pub struct CreateAddress {
    pub contact_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub created_by: i64,
}

impl Address {
    /// Inserts an address under an already-verified contact.
    pub async fn create(pool: &PgPool, data: CreateAddress) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (contact_id, line1, line2, city, state, pincode, country, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, contact_id, line1, line2, city, state, pincode, country,
                      created_by, created_at
            "#,
        )
        .bind(data.contact_id)
        .bind(data.line1)
        .bind(data.line2)
        .bind(data.city)
        .bind(data.state)
        .bind(data.pincode)
        .bind(data.country)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Fetches all addresses belonging to the given contacts in one query,
    /// for in-memory grouping under their parents.
    pub async fn list_by_contacts(
        pool: &PgPool,
        contact_ids: &[i64],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(
            r#"
            SELECT id, contact_id, line1, line2, city, state, pincode, country,
                   created_by, created_at
            FROM addresses
            WHERE contact_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(contact_ids)
        .fetch_all(pool)
        .await
    }
}
