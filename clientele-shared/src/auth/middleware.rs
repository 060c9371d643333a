/// The auth gate: bearer-token middleware for Axum
///
/// Every protected route sits behind [`require_auth`]. It extracts the
/// bearer token from the `Authorization` header, validates signature and
/// expiry, checks the payload actually carries a user id, and injects an
/// [`AuthContext`] into request extensions for handlers to pick up with
/// `Extension<AuthContext>`.
///
/// All failures are terminal for the request and respond 401 with a JSON
/// `{"error": ...}` body; no retry semantics, no data disclosed.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use clientele_shared::auth::middleware::{require_auth, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
///
/// let secret = "server-held-signing-secret-32-bytes!".to_string();
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(move |req, next| {
///         require_auth(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{validate_token, JwtError};

/// Authenticated principal, injected into request extensions
///
/// Handlers treat this as the sole source of identity; nothing from the
/// request body or query string ever overrides it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: i64,
}

impl AuthContext {
    /// Creates an auth context for a verified user id
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Error type for the auth gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header absent
    #[error("Access denied. Please log in.")]
    MissingCredentials,

    /// Header present but not a Bearer credential
    #[error("Expected a Bearer token")]
    InvalidScheme,

    /// Signature or expiry verification failed
    #[error("Invalid or expired token")]
    InvalidToken(#[source] JwtError),

    /// Well-signed token whose payload lacks the user id
    #[error("Invalid token payload")]
    MalformedPrincipal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Everything the gate rejects is 401: absent, malformed, invalid,
        // expired, or shapeless tokens are all equally unauthenticated.
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts and validates the bearer token, returning the principal.
///
/// Split out from the middleware so the server's error type can wrap it
/// and so it can be exercised without a running router.
pub fn authenticate(auth_header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let header_value = auth_header.ok_or(AuthError::MissingCredentials)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidScheme)?;

    let claims = validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    // Signature validity does not guarantee payload shape.
    let user_id = claims.sub.ok_or(AuthError::MalformedPrincipal)?;

    Ok(AuthContext::new(user_id))
}

/// Bearer-token authentication middleware
///
/// On success the request proceeds with [`AuthContext`] in its extensions;
/// on failure the request ends here with a 401.
pub async fn require_auth(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = authenticate(auth_header, &secret)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_authenticate_valid_token() {
        let token = create_token(&Claims::new(7, 900), SECRET).unwrap();

        let ctx = authenticate(Some(&bearer(&token)), SECRET).expect("Should authenticate");
        assert_eq!(ctx.user_id, 7);
    }

    #[test]
    fn test_authenticate_missing_header() {
        assert!(matches!(
            authenticate(None, SECRET),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        assert!(matches!(
            authenticate(Some("Basic dXNlcjpwYXNz"), SECRET),
            Err(AuthError::InvalidScheme)
        ));
    }

    #[test]
    fn test_authenticate_garbage_token() {
        assert!(matches!(
            authenticate(Some("Bearer not.a.jwt"), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let mut claims = Claims::new(7, 900);
        claims.iat -= 3600;
        claims.exp = claims.iat + 900;
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            authenticate(Some(&bearer(&token)), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_well_signed_but_no_subject() {
        let claims = Claims {
            sub: None,
            iss: "clientele".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
        };
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            authenticate(Some(&bearer(&token)), SECRET),
            Err(AuthError::MalformedPrincipal)
        ));
    }

    #[test]
    fn test_auth_errors_respond_401() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidScheme,
            AuthError::MalformedPrincipal,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
