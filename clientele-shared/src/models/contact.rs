/// Contact model and ownership-scoped operations
///
/// Contacts are the root of the ownership chain below the user: addresses
/// and tasks reference a contact and inherit its owner. Every lookup here
/// binds `(id, user_id)` in one statement so cross-user rows read as
/// nonexistent.
///
/// `full_name` is a stored generated column (first + last); it is selected
/// but never written by application code.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contacts (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     full_name VARCHAR(201) GENERATED ALWAYS AS (first_name || ' ' || last_name) STORED,
///     number VARCHAR(32) NOT NULL,
///     email VARCHAR(255),
///     note TEXT,
///     created_by BIGINT,
///     updated_by BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT contacts_user_id_number_key UNIQUE (user_id, number)
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::address::Address;
use super::task::Task;

const CONTACT_COLUMNS: &str = "id, user_id, first_name, last_name, full_name, number, \
                               email, note, created_by, updated_by, created_at, updated_at";

/// A contact row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Denormalized enrichment maintained by the database
    pub full_name: String,

    /// Contact number, unique per owner
    pub number: String,

    pub email: Option<String>,

    pub note: Option<String>,

    pub created_by: Option<i64>,

    pub updated_by: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A contact with its child rows attached
///
/// This is the list/get response shape: one query per child table, grouped
/// in memory, so the client never needs N+1 follow-up calls.
#[derive(Debug, Clone, Serialize)]
pub struct ContactWithChildren {
    #[serde(flatten)]
    pub contact: Contact,

    pub addresses: Vec<Address>,

    pub tasks: Vec<Task>,
}

/// Input for creating a contact
#[derive(Debug, Clone)]
pub struct CreateContact {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    pub email: Option<String>,
    pub note: Option<String>,
}

/// Partial update for a contact
///
/// Absent fields keep their stored value. For the nullable fields an
/// explicit JSON `null` clears the column — `Option<Option<T>>` with
/// `#[serde(default)]` keeps the two cases apart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub number: Option<String>,
    #[serde(default)]
    pub email: Option<Option<String>>,
    #[serde(default)]
    pub note: Option<Option<String>>,
}

/// Fully merged column values ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ContactValues {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    pub email: Option<String>,
    pub note: Option<String>,
}

impl UpdateContact {
    /// Overlays this patch on an existing row.
    pub fn merge_into(self, existing: &Contact) -> ContactValues {
        ContactValues {
            first_name: self
                .first_name
                .unwrap_or_else(|| existing.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| existing.last_name.clone()),
            number: self.number.unwrap_or_else(|| existing.number.clone()),
            email: self.email.unwrap_or_else(|| existing.email.clone()),
            note: self.note.unwrap_or_else(|| existing.note.clone()),
        }
    }
}

impl Contact {
    /// Inserts a contact attributed to its owner.
    ///
    /// A duplicate `(user_id, number)` violates the unique constraint;
    /// callers translate that into a conflict response.
    pub async fn create(pool: &PgPool, data: CreateContact) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (user_id, first_name, last_name, number, email, note,
                                  created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $1, $1)
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.number)
        .bind(data.email)
        .bind(data.note)
        .fetch_one(pool)
        .await
    }

    /// Lists a user's contacts, oldest first.
    pub async fn list_by_owner(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE user_id = $1 ORDER BY id",
        ))
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
        sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Scoped existence check used for cross-reference validation before
    /// writing a task or address that points at this contact.
    pub async fn exists_scoped(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM contacts WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(row.is_some())
    }

    /// Writes merged values back, scoped by `(id, user_id)`.
    ///
    /// Returns `None` when nothing matched, which callers report exactly
    /// like a missing row.
    pub async fn update_scoped(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        values: ContactValues,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts
            SET first_name = $1, last_name = $2, number = $3, email = $4, note = $5,
                updated_by = $7, updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(values.first_name)
        .bind(values.last_name)
        .bind(values.number)
        .bind(values.email)
        .bind(values.note)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Scoped delete; child addresses and tasks cascade in the database.
    pub async fn delete_scoped(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a user's contacts with nested addresses and tasks.
    ///
    /// Three batched queries — the contacts, then all their addresses,
    /// then all their tasks — joined in memory by contact id.
    pub async fn list_with_children(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<ContactWithChildren>, sqlx::Error> {
        let contacts = Self::list_by_owner(pool, user_id).await?;
        if contacts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
        let addresses = Address::list_by_contacts(pool, &ids).await?;
        let tasks = Task::list_by_contacts(pool, &ids).await?;

        Ok(attach_children(contacts, addresses, tasks))
    }

    /// Single contact with nested children, scoped.
    pub async fn find_with_children(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<ContactWithChildren>, sqlx::Error> {
        let Some(contact) = Self::find_scoped(pool, id, user_id).await? else {
            return Ok(None);
        };

        let ids = [contact.id];
        let addresses = Address::list_by_contacts(pool, &ids).await?;
        let tasks = Task::list_by_contacts(pool, &ids).await?;

        Ok(attach_children(vec![contact], addresses, tasks).pop())
    }
}

/// Groups child rows under their parent contacts.
///
/// Each child lands under exactly one parent (its `contact_id`), children
/// keep their query order, and contacts keep theirs. Children fetched for
/// these contacts always find their parent in the index; anything else
/// would mean the batched queries disagreed with the contact list.
pub fn attach_children(
    contacts: Vec<Contact>,
    addresses: Vec<Address>,
    tasks: Vec<Task>,
) -> Vec<ContactWithChildren> {
    let mut nested: Vec<ContactWithChildren> = contacts
        .into_iter()
        .map(|contact| ContactWithChildren {
            contact,
            addresses: Vec::new(),
            tasks: Vec::new(),
        })
        .collect();

    let index: HashMap<i64, usize> = nested
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.contact.id, i))
        .collect();

    for address in addresses {
        if let Some(&i) = index.get(&address.contact_id) {
            nested[i].addresses.push(address);
        }
    }

    for task in tasks {
        if let Some(i) = task.contact_id.and_then(|id| index.get(&id).copied()) {
            nested[i].tasks.push(task);
        }
    }

    nested
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contact(id: i64) -> Contact {
        Contact {
            id,
            user_id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            full_name: "Jane Doe".to_string(),
            number: "2222222222".to_string(),
            email: Some("jane@example.com".to_string()),
            note: Some("met at conference".to_string()),
            created_by: Some(1),
            updated_by: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_address(id: i64, contact_id: i64) -> Address {
        Address {
            id,
            contact_id,
            line1: "1 Main St".to_string(),
            line2: None,
            city: Some("Springfield".to_string()),
            state: None,
            pincode: None,
            country: None,
            created_by: Some(1),
            created_at: Utc::now(),
        }
    }

    fn sample_task(id: i64, contact_id: Option<i64>) -> Task {
        Task {
            id,
            user_id: 1,
            contact_id,
            title: format!("task {}", id),
            description: None,
            status: "pending".to_string(),
            due_date: None,
            created_by: Some(1),
            updated_by: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_absent_fields_keep_stored_values() {
        let existing = sample_contact(5);
        let patch = UpdateContact {
            number: Some("3333333333".to_string()),
            ..Default::default()
        };

        let merged = patch.merge_into(&existing);

        assert_eq!(merged.number, "3333333333");
        assert_eq!(merged.first_name, "Jane");
        assert_eq!(merged.email, Some("jane@example.com".to_string()));
        assert_eq!(merged.note, Some("met at conference".to_string()));
    }

    #[test]
    fn test_merge_explicit_null_clears_nullable_field() {
        let existing = sample_contact(5);
        let patch: UpdateContact = serde_json::from_str(r#"{"email": null}"#).unwrap();

        assert_eq!(patch.email, Some(None));

        let merged = patch.merge_into(&existing);
        assert_eq!(merged.email, None);
        // Absent stays untouched.
        assert_eq!(merged.note, Some("met at conference".to_string()));
    }

    #[test]
    fn test_merge_absent_nullable_field_is_not_cleared() {
        let existing = sample_contact(5);
        let patch: UpdateContact = serde_json::from_str(r#"{"first_name": "Janet"}"#).unwrap();

        assert_eq!(patch.email, None);

        let merged = patch.merge_into(&existing);
        assert_eq!(merged.first_name, "Janet");
        assert_eq!(merged.email, Some("jane@example.com".to_string()));
    }

    #[test]
    fn test_attach_children_groups_one_to_one() {
        let contacts = vec![sample_contact(1), sample_contact(2), sample_contact(3)];
        let addresses = vec![
            sample_address(10, 1),
            sample_address(11, 2),
            sample_address(12, 1),
        ];
        let tasks = vec![sample_task(20, Some(2)), sample_task(21, Some(2))];

        let nested = attach_children(contacts, addresses, tasks);

        assert_eq!(nested.len(), 3);
        assert_eq!(
            nested[0].addresses.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![10, 12]
        );
        assert!(nested[0].tasks.is_empty());
        assert_eq!(nested[1].addresses.len(), 1);
        assert_eq!(nested[1].tasks.len(), 2);
        assert!(nested[2].addresses.is_empty());
        assert!(nested[2].tasks.is_empty());

        // No child dropped, none duplicated.
        let total_addresses: usize = nested.iter().map(|c| c.addresses.len()).sum();
        let total_tasks: usize = nested.iter().map(|c| c.tasks.len()).sum();
        assert_eq!(total_addresses, 3);
        assert_eq!(total_tasks, 2);
    }

    #[test]
    fn test_attach_children_empty_inputs() {
        let nested = attach_children(vec![sample_contact(1)], Vec::new(), Vec::new());

        assert_eq!(nested.len(), 1);
        assert!(nested[0].addresses.is_empty());
        assert!(nested[0].tasks.is_empty());
    }

    #[test]
    fn test_nested_contact_serializes_flat_with_child_arrays() {
        let nested = attach_children(vec![sample_contact(1)], Vec::new(), Vec::new());
        let json = serde_json::to_value(&nested[0]).unwrap();

        assert_eq!(json["first_name"], "Jane");
        assert_eq!(json["full_name"], "Jane Doe");
        assert!(json["addresses"].as_array().unwrap().is_empty());
        assert!(json["tasks"].as_array().unwrap().is_empty());
    }
}
