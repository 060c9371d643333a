/// Database layer for Clientele
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with startup health check
/// - `migrations`: sqlx migration runner and status query
///
/// The pool is the only cross-request shared state in the system. It is
/// constructed explicitly at startup and handed to the router as part of
/// application state — never a module-level singleton.

pub mod migrations;
pub mod pool;
