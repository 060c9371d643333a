/// API route handlers
///
/// One module per resource:
///
/// - `health`: health check
/// - `auth`: registration and login (the only public endpoints)
/// - `contacts`: contact CRUD with nested children, plus per-contact addresses
/// - `tasks`: task CRUD with partial update
/// - `addresses`: standalone address creation
/// - `emails`: simulated send + log listing

pub mod addresses;
pub mod auth;
pub mod contacts;
pub mod emails;
pub mod health;
pub mod tasks;

use validator::ValidationErrors;

/// Flattens validator output into the single human-readable message the
/// error body carries.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,

        #[validate(length(min = 1, message = "Required"))]
        name: String,
    }

    #[test]
    fn test_validation_message_is_flat_and_deterministic() {
        let probe = Probe {
            email: "not-an-email".to_string(),
            name: String::new(),
        };

        let errors = probe.validate().unwrap_err();
        let message = validation_message(&errors);

        assert_eq!(message, "email: Invalid email format; name: Required");
    }
}
