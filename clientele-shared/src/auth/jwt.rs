/// Session token issue and validation
///
/// Tokens are stateless HS256 JWTs carrying the authenticated user's id.
/// A token is created at login with a short, fixed lifetime (15 minutes
/// by default), expires on its own, and cannot be revoked earlier — there
/// is no server-side session table or blacklist.
///
/// The `sub` claim is deliberately optional in the wire shape: a token
/// can be well-signed yet carry no identifier, and the auth gate must be
/// able to tell that apart from a bad signature.
///
/// # Example
///
/// ```
/// use clientele_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(42, 900);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, Some(42));
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer name embedded in every token
const ISSUER: &str = "clientele";

/// Default token lifetime in seconds (15 minutes)
pub const DEFAULT_TTL_SECONDS: i64 = 15 * 60;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Session token claims
///
/// # Claims
///
/// - `sub`: the authenticated user's id — optional so the verifier can
///   detect a signed token whose payload is missing the identifier
/// - `iss`: always "clientele"
/// - `iat` / `exp`: issue and expiry timestamps (Unix seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Option<i64>,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the given lifetime in seconds.
    pub fn new(user_id: i64, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(ttl_seconds);

        Self {
            sub: Some(user_id),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds remaining until expiry, clamped to zero.
    ///
    /// Echoed to login callers as `expiresInSeconds`.
    pub fn expires_in_seconds(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Signs the claims into a JWT using HS256.
///
/// The secret must be at least 32 bytes; config enforces this at startup.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token's signature, expiry, and issuer, returning the claims.
///
/// Payload shape beyond the registered claims is NOT checked here: a
/// well-signed token with a missing `sub` validates and comes back with
/// `claims.sub == None`. The auth gate makes that call.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, DEFAULT_TTL_SECONDS);

        assert_eq!(claims.sub, Some(7));
        assert_eq!(claims.iss, "clientele");
        assert!(!claims.is_expired());
        assert!(claims.expires_in_seconds() > DEFAULT_TTL_SECONDS - 5);
        assert!(claims.expires_in_seconds() <= DEFAULT_TTL_SECONDS);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(42, 900);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, Some(42));
        assert_eq!(validated.iss, "clientele");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, 900);
        let token = create_token(&claims, SECRET).expect("Should create token");

        assert!(validate_token(&token, "a-completely-different-secret-key").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let mut claims = Claims::new(1, 900);
        claims.iat -= 3600;
        claims.exp = claims.iat + 900;

        assert!(claims.is_expired());
        assert_eq!(claims.expires_in_seconds(), 0);

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_token_without_subject() {
        // A token an attacker (or a buggy issuer) signed without `sub`
        // still validates; the missing identifier surfaces as None.
        let claims = Claims {
            sub: None,
            iss: "clientele".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
        };
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, None);
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let claims = Claims {
            sub: Some(1),
            iss: "someone-else".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 900,
        };
        let token = create_token(&claims, SECRET).expect("Should create token");

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }
}
