/// Database models and ownership-scoped operations
///
/// One module per table. Every read/update/delete of an owned row binds
/// both the row id and the owning user id in a single statement, so a row
/// that exists but belongs to someone else is indistinguishable from a row
/// that does not exist.
///
/// - `user`: credential records
/// - `contact`: contacts owned directly by a user
/// - `address`: addresses owned transitively through a contact
/// - `task`: tasks owned by a user, optionally linked to a contact
/// - `email_log`: simulated outbound mail, attributed to its sender

pub mod address;
pub mod contact;
pub mod email_log;
pub mod task;
pub mod user;
