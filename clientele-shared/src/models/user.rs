/// User model and credential-store operations
///
/// Users are created at registration and immutable afterwards (apart from
/// the last-login stamp). Both email and phone are unique and either one
/// works as the login identifier.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     phone VARCHAR(32) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A credential record
///
/// The password is stored only as an Argon2id hash and never leaves the
/// server: the field is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id
    pub id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Phone number, unique across all users
    pub phone: String,

    /// Argon2id password hash (PHC string), never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Registering principal, when one existed
    pub created_by: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Argon2id hash, NOT the plaintext password
    pub password_hash: String,
}

impl User {
    /// Inserts a new credential record.
    ///
    /// A duplicate email or phone violates the table's unique constraints;
    /// callers translate that into a conflict response.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, phone, password_hash,
                      created_by, created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await
    }

    /// Looks up a user by login identifier — email or phone, same field.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone, password_hash,
                   created_by, created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1 OR phone = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether either identity field is already registered.
    ///
    /// This is the friendly pre-check; the unique constraints remain the
    /// source of truth under concurrent registration.
    pub async fn identity_taken(
        pool: &PgPool,
        email: &str,
        phone: &str,
    ) -> Result<bool, sqlx::Error> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 OR phone = $2 LIMIT 1")
                .bind(email)
                .bind(phone)
                .fetch_optional(pool)
                .await?;

        Ok(existing.is_some())
    }

    /// Stamps `last_login_at` after a successful authentication.
    pub async fn update_last_login(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "1111111111".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
