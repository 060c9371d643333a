/// Typed HTTP client for the Clientele API
///
/// Wraps `reqwest` and the [`SessionManager`]: `login` stores the issued
/// token, and every subsequent call attaches it as a bearer credential.
/// Server error bodies (`{"error": ...}`) surface as
/// [`ClientError::Api`] instead of panics or opaque status codes.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ClientError, ErrorBody};
use crate::session::SessionManager;

/// Registration input
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Contact creation input
#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Contact partial update
///
/// `None` fields are omitted from the request body and keep their stored
/// values; `Some(None)` serializes as an explicit `null` and clears the
/// field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

/// Task creation input
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
}

/// Task partial update; same absent-vs-null convention as [`ContactPatch`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Option<i64>>,
}

/// Address creation input for `POST /addresses`
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub contact_id: i64,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Address creation input for `POST /contacts/:id/address`
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewContactAddress {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Simulated email input
#[derive(Debug, Clone, Serialize)]
pub struct NewEmail {
    pub to_email: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A task as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    pub id: i64,
    pub user_id: i64,
    pub contact_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    /// Present on the list endpoint (joined contact name)
    #[serde(default)]
    pub contact_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An address as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct AddressEntry {
    pub id: i64,
    pub contact_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A contact with its nested children, as returned by list/get
#[derive(Debug, Clone, Deserialize)]
pub struct ContactEntry {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub number: String,
    pub email: Option<String>,
    pub note: Option<String>,
    pub addresses: Vec<AddressEntry>,
    pub tasks: Vec<TaskEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An email log row as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct EmailEntry {
    pub id: i64,
    pub user_id: i64,
    pub to_email: String,
    pub subject: String,
    pub body: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterOutcome {
    #[allow(dead_code)]
    ok: bool,
    user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginOutcome {
    token: String,
    expires_in_seconds: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactCreated {
    contact_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskCreated {
    task_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressCreated {
    address_id: i64,
}

#[derive(Debug, Deserialize)]
struct EmailCreated {
    id: i64,
}

/// The Clientele API client
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: SessionManager,
}

impl Client {
    /// Creates a client for the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            session: SessionManager::new(),
        })
    }

    /// The underlying session manager
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Whether a live (unexpired) session is present
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Subscribes to sign-out events; fires when the expiry timer clears
    /// the session or [`Client::sign_out`] is called.
    pub fn signed_out(&self) -> tokio::sync::watch::Receiver<u64> {
        self.session.signed_out()
    }

    /// Drops the stored token and cancels the expiry timer.
    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// Registers a new user; returns the new user id.
    pub async fn register(&self, user: NewUser) -> Result<i64, ClientError> {
        let outcome: RegisterOutcome = self.call(Method::POST, "/auth/register", Some(&user)).await?;
        Ok(outcome.user_id)
    }

    /// Logs in with an email or phone identifier, storing the issued
    /// token and arming the expiry timer. Returns the token lifetime in
    /// seconds.
    pub async fn login(
        &self,
        email_or_phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<i64, ClientError> {
        #[derive(Serialize)]
        struct LoginBody {
            #[serde(rename = "emailOrPhone")]
            email_or_phone: String,
            password: String,
        }

        let body = LoginBody {
            email_or_phone: email_or_phone.into(),
            password: password.into(),
        };

        let outcome: LoginOutcome = self.call(Method::POST, "/auth/login", Some(&body)).await?;

        self.session
            .store(outcome.token, outcome.expires_in_seconds);

        Ok(outcome.expires_in_seconds)
    }

    /// Lists contacts with nested addresses and tasks.
    pub async fn contacts(&self) -> Result<Vec<ContactEntry>, ClientError> {
        self.call(Method::GET, "/contacts", None::<&()>).await
    }

    /// Fetches one contact with nested children.
    pub async fn contact(&self, id: i64) -> Result<ContactEntry, ClientError> {
        self.call(Method::GET, &format!("/contacts/{}", id), None::<&()>)
            .await
    }

    /// Creates a contact; returns its id.
    pub async fn create_contact(&self, contact: NewContact) -> Result<i64, ClientError> {
        let created: ContactCreated = self.call(Method::POST, "/contacts", Some(&contact)).await?;
        Ok(created.contact_id)
    }

    /// Applies a partial update to a contact.
    pub async fn update_contact(&self, id: i64, patch: ContactPatch) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .call(Method::PUT, &format!("/contacts/{}", id), Some(&patch))
            .await?;
        Ok(())
    }

    /// Deletes a contact (its addresses and tasks go with it).
    pub async fn delete_contact(&self, id: i64) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .call(Method::DELETE, &format!("/contacts/{}", id), None::<&()>)
            .await?;
        Ok(())
    }

    /// Adds an address under a contact; returns the address id.
    pub async fn add_contact_address(
        &self,
        contact_id: i64,
        address: NewContactAddress,
    ) -> Result<i64, ClientError> {
        let created: AddressCreated = self
            .call(
                Method::POST,
                &format!("/contacts/{}/address", contact_id),
                Some(&address),
            )
            .await?;
        Ok(created.address_id)
    }

    /// Lists tasks, newest first.
    pub async fn tasks(&self) -> Result<Vec<TaskEntry>, ClientError> {
        self.call(Method::GET, "/tasks", None::<&()>).await
    }

    /// Fetches one task.
    pub async fn task(&self, id: i64) -> Result<TaskEntry, ClientError> {
        self.call(Method::GET, &format!("/tasks/{}", id), None::<&()>)
            .await
    }

    /// Creates a task; returns its id.
    pub async fn create_task(&self, task: NewTask) -> Result<i64, ClientError> {
        let created: TaskCreated = self.call(Method::POST, "/tasks", Some(&task)).await?;
        Ok(created.task_id)
    }

    /// Applies a partial update to a task.
    pub async fn update_task(&self, id: i64, patch: TaskPatch) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .call(Method::PUT, &format!("/tasks/{}", id), Some(&patch))
            .await?;
        Ok(())
    }

    /// Deletes a task.
    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .call(Method::DELETE, &format!("/tasks/{}", id), None::<&()>)
            .await?;
        Ok(())
    }

    /// Creates an address via the standalone endpoint; returns its id.
    pub async fn create_address(&self, address: NewAddress) -> Result<i64, ClientError> {
        let created: AddressCreated = self
            .call(Method::POST, "/addresses", Some(&address))
            .await?;
        Ok(created.address_id)
    }

    /// Records a simulated email send; returns the log row id.
    pub async fn send_email(&self, email: NewEmail) -> Result<i64, ClientError> {
        let created: EmailCreated = self.call(Method::POST, "/email/send", Some(&email)).await?;
        Ok(created.id)
    }

    /// Lists the caller's recent email log, newest first.
    pub async fn emails(&self) -> Result<Vec<EmailEntry>, ClientError> {
        self.call(Method::GET, "/email", None::<&()>).await
    }

    /// Sends one request: bearer credential attached when a live session
    /// exists, JSON body when one is given, error bodies decoded into
    /// [`ClientError::Api`].
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);

        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };

            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_omits_absent_fields() {
        let patch = TaskPatch {
            status: Some("completed".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"status": "completed"}));
    }

    #[test]
    fn test_patch_explicit_null_is_preserved() {
        let patch = TaskPatch {
            contact_id: Some(None),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"contact_id": null}));
    }

    #[test]
    fn test_contact_patch_clear_vs_keep() {
        let patch = ContactPatch {
            number: Some("3333333333".to_string()),
            email: Some(None),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"number": "3333333333", "email": null})
        );
    }

    #[test]
    fn test_new_contact_serializes_required_fields_only() {
        let contact = NewContact {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            number: "2222222222".to_string(),
            email: None,
            note: None,
        };

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "number": "2222222222"
            })
        );
    }
}
