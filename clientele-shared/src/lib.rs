//! # Clientele Shared Library
//!
//! This crate contains the types and plumbing shared between the Clientele
//! API server and the client library.
//!
//! ## Module Organization
//!
//! - `models`: Database models and ownership-scoped query operations
//! - `auth`: Password hashing, token issue/verify, and the auth gate middleware
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Clientele shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
