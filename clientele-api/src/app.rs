/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use clientele_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use clientele_shared::auth::middleware::require_auth;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor; the pool and
/// config are the only cross-request resources in the process.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Signing secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Session token lifetime in seconds
    pub fn token_ttl(&self) -> i64 {
        self.config.jwt.ttl_seconds
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Route map
///
/// ```text
/// /
/// ├── GET  /health                   # public
/// ├── /auth/                         # public
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /contacts/                     # bearer auth
/// │   ├── POST / · GET /
/// │   ├── GET /:id · PUT /:id · DELETE /:id
/// │   └── POST /:id/address
/// ├── /tasks/                        # bearer auth
/// │   ├── POST / · GET /
/// │   └── GET /:id · PUT /:id · DELETE /:id
/// ├── /addresses/                    # bearer auth
/// │   └── POST /
/// └── /email/                        # bearer auth
///     ├── POST /send
///     └── GET /
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Registration and login are the only unauthenticated endpoints.
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let contact_routes = Router::new()
        .route(
            "/",
            post(routes::contacts::create_contact).get(routes::contacts::list_contacts),
        )
        .route(
            "/:id",
            get(routes::contacts::get_contact)
                .put(routes::contacts::update_contact)
                .delete(routes::contacts::delete_contact),
        )
        .route("/:id/address", post(routes::contacts::add_contact_address));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let address_routes = Router::new().route("/", post(routes::addresses::create_address));

    let email_routes = Router::new()
        .route("/send", post(routes::emails::send_email))
        .route("/", get(routes::emails::list_emails));

    // Everything below this layer sees an AuthContext in extensions.
    let protected_routes = Router::new()
        .nest("/contacts", contact_routes)
        .nest("/tasks", task_routes)
        .nest("/addresses", address_routes)
        .nest("/email", email_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate,
        ));

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// The auth gate as a router layer
///
/// Delegates extraction and validation to the shared middleware and maps
/// its failures into the server's error taxonomy.
async fn auth_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let secret = state.jwt_secret().to_string();
    Ok(require_auth(secret, req, next).await?)
}
