//! # Clientele Client Library
//!
//! Client-side companion to the Clientele API: a session manager that
//! holds the issued token and signs itself out at expiry, and a typed
//! HTTP client that attaches the token to every request.
//!
//! The session timer is a convenience for the embedding application — the
//! server re-verifies signature and expiry on every request regardless of
//! what the client believes.
//!
//! ## Example
//!
//! ```no_run
//! use clientele_client::{Client, NewContact};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://localhost:4000")?;
//!
//! client.login("ada@example.com", "secret123").await?;
//!
//! let contact_id = client
//!     .create_contact(NewContact {
//!         first_name: "Jane".into(),
//!         last_name: "Doe".into(),
//!         number: "2222222222".into(),
//!         email: None,
//!         note: None,
//!     })
//!     .await?;
//!
//! // React to the session expiring (e.g. navigate to a login view).
//! let mut signed_out = client.signed_out();
//! tokio::spawn(async move {
//!     if signed_out.changed().await.is_ok() {
//!         println!("Session expired, back to login");
//!     }
//! });
//! # let _ = contact_id;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;

pub use client::{
    AddressEntry, Client, ContactEntry, ContactPatch, EmailEntry, NewAddress, NewContact,
    NewContactAddress, NewEmail, NewTask, NewUser, TaskEntry, TaskPatch,
};
pub use error::ClientError;
pub use session::SessionManager;
