/// Error type for the client library

use serde::Deserialize;

/// Shape of the server's error bodies: `{"error": "..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Client-side error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, bad TLS, ...)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status; `message` is the
    /// human-readable `error` field from the response body.
    #[error("Server responded {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// True when the server rejected the request as unauthenticated —
    /// the cue to clear the session and return to the login view.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_detection() {
        let err = ClientError::Api {
            status: 401,
            message: "Access denied. Please log in.".to_string(),
        };
        assert!(err.is_unauthenticated());

        let err = ClientError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        assert!(!err.is_unauthenticated());
    }
}
