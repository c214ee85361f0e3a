//! # orbitfund: Submission Intake API for Crowdfunded Space Missions
//!
//! `orbitfund` is the backend for a crowdfunding platform where users pitch
//! "mission" proposals. It exposes a JSON (+multipart) HTTP API for account
//! registration and login, authenticated submission of mission proposals with
//! media attachments, and an admin-only review surface for pending proposals.
//!
//! ## Overview
//!
//! A submission mixes structured text fields (title, goals, funding target,
//! campaign duration, ...) with media files (images, video, documents). Files
//! are uploaded one at a time to an object storage backend; an individual
//! upload failure is logged and skipped rather than failing the whole
//! submission, and the proposal row records exactly the URLs that succeeded.
//! Reviewers list pending proposal ids and fetch details, with stored media
//! URLs exchanged for time-limited signed URLs so private buckets work.
//!
//! Authentication is JWT-based: login issues a short-lived HS256 token carried
//! in the `Authorization: Bearer` header. Admin routes re-check the admin
//! grant against the users table on every request, so a forged or stale role
//! claim in a token never grants access.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer, PostgreSQL (via sqlx) for persistence, and a pluggable
//! object storage backend (S3-compatible services or the local filesystem).
//!
//! The **API layer** ([`api`]) holds the route handlers and wire models. The
//! **authentication layer** ([`auth`]) covers password hashing, token
//! issue/verify, and request extractors. The **database layer** ([`db`]) uses
//! the repository pattern over sqlx connections. The **storage layer**
//! ([`storage`]) abstracts media persistence behind the `ObjectStorage` trait.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use orbitfund::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = orbitfund::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     orbitfund::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! orbitfund::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
    storage::ObjectStorage,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{SubmissionId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from environment/files
/// - `storage`: Object storage backend for submission media
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub storage: Arc<dyn ObjectStorage>,
}

/// Get the orbitfund database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: a fresh database gets an admin account so there is always a
/// reviewer available; an existing account with the same email is promoted to
/// admin if it isn't one already, and is otherwise left untouched.
///
/// Returns the user ID of the created or existing admin user.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(username: &str, email: &str, password: &str, db: &PgPool) -> anyhow::Result<UserId> {
    let mut tx = db.begin().await?;

    if let Some(existing_user) = Users::new(&mut tx).get_user_by_email(email).await? {
        if !existing_user.is_admin() {
            sqlx::query("UPDATE users SET admin_granted_at = NOW() WHERE id = $1")
                .bind(existing_user.id)
                .execute(&mut *tx)
                .await?;
            info!("Promoted existing user {} to admin", existing_user.id);
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let password_hash = password::hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let user_create = UserCreateDBRequest {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        admin_granted_at: Some(chrono::Utc::now()),
    };

    let created_user = Users::new(&mut tx).create(&user_create).await?;
    tx.commit().await?;

    info!("Created initial admin user {}", created_user.id);
    Ok(created_user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    if config.cors.allow_credentials {
        // Any() is incompatible with credentials; restrict to the standard set
        cors = CorsLayer::new()
            .allow_origin(
                config
                    .cors
                    .allowed_origins
                    .iter()
                    .filter_map(|o| match o {
                        CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>().ok(),
                        CorsOrigin::Wildcard => None,
                    })
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]);
    }

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - User routes (registration, login, admin verification)
/// - Submission intake with a configurable multipart body limit
/// - Admin approval routes
/// - OpenAPI documentation at `/api/docs`
/// - CORS configuration
/// - Tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;
    let body_limit = state.config.limits.max_body_bytes;

    let api_routes = Router::new()
        .route("/users/register", post(api::handlers::users::register))
        .route("/users/login", post(api::handlers::users::login))
        .route("/users/verify-admin", get(api::handlers::users::verify_admin))
        .route(
            "/submissions",
            post(api::handlers::submissions::submit).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/approvals/pending-ids", get(api::handlers::approvals::pending_ids))
        .route("/approvals/{id}", get(api::handlers::approvals::submission_details))
        .route("/health", get(api::handlers::health::health))
        .with_state(state);

    let router = Router::new()
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, bootstraps the initial admin user, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests
///    drain and the pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    embedded_db: Option<db::embedded::EmbeddedDatabase>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (embedded_db, database_url) = match &config.database {
            config::DatabaseConfig::Embedded { data_dir, persistent, .. } => {
                info!("Starting with embedded database (persistent: {persistent})");
                let embedded = db::embedded::EmbeddedDatabase::start(data_dir.clone(), *persistent).await?;
                let url = embedded.connection_string().to_string();
                (Some(embedded), url)
            }
            config::DatabaseConfig::External { url, .. } => (None, url.clone()),
        };

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections())
            .connect(&database_url)
            .await?;
        migrator().run(&pool).await?;

        // Bootstrap a reviewer account when configured
        if let (Some(email), Some(password)) = (config.admin_email.as_deref(), config.admin_password.as_deref()) {
            create_initial_admin_user(&config.admin_username, email, password, &pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;
        }

        let storage = storage::create_storage(&config.storage);

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).storage(storage).build();

        let router = build_router(app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            embedded_db,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("orbitfund listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        if let Some(embedded) = self.embedded_db {
            embedded.stop().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use axum_test::TestServer;
    use serde_json::json;

    // Lazy pool: connections are only opened on first query, so routes that
    // reject before touching the database can be exercised without one.
    fn test_state() -> AppState {
        let mut config = Config::default();
        config.auth.jwt_secret = Some("test-secret-key-for-jwt".to_string());

        let pool = PgPool::connect_lazy("postgres://localhost:1/unreachable").unwrap();

        AppState::builder()
            .db(pool)
            .config(config)
            .storage(Arc::new(MemoryStorage::new()))
            .build()
    }

    fn test_server() -> TestServer {
        TestServer::new(build_router(test_state()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = test_server();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_register_rejects_blank_username() {
        let server = test_server();

        let response = server
            .post("/api/users/register")
            .json(&json!({"username": "  ", "email": "a@example.com", "password": "password123"}))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let server = test_server();

        let response = server
            .post("/api/users/register")
            .json(&json!({"username": "ada", "email": "ada@example.com", "password": "short"}))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_admin_requires_token() {
        let server = test_server();

        let response = server.get("/api/users/verify-admin").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_pending_ids_rejects_garbage_token() {
        let server = test_server();

        let response = server
            .get("/api/approvals/pending-ids")
            .add_header("authorization", "Bearer not-a-jwt")
            .await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_submission_requires_token() {
        let server = test_server();

        let response = server.post("/api/submissions").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_duplicate_registration_returns_conflict(pool: PgPool) {
        let server = test_utils::create_test_server(pool);

        let response = server
            .post("/api/users/register")
            .json(&json!({"username": "kepler", "email": "kepler@example.com", "password": "orbital-mechanics"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        // Same email, fresh username: the row must not be duplicated
        let response = server
            .post("/api/users/register")
            .json(&json!({"username": "kepler-two", "email": "kepler@example.com", "password": "orbital-mechanics"}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test]
    async fn test_login_failures_are_indistinguishable(pool: PgPool) {
        let server = test_utils::create_test_server(pool.clone());
        let user = test_utils::create_test_user(&pool, "kepler", false).await;

        let wrong_password = server
            .post("/api/users/login")
            .json(&json!({"email": user.email, "password": "not-the-password"}))
            .await;
        let unknown_email = server
            .post("/api/users/login")
            .json(&json!({"email": "ghost@example.com", "password": "not-the-password"}))
            .await;

        wrong_password.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_email.text());
    }

    #[sqlx::test]
    async fn test_submission_without_files_creates_pending_row(pool: PgPool) {
        use crate::db::handlers::Submissions;
        use axum_test::multipart::MultipartForm;

        let server = test_utils::create_test_server(pool.clone());
        let user = test_utils::create_test_user(&pool, "kepler", false).await;
        let token = test_utils::bearer_token_for(&user, &test_utils::create_test_config());

        let form = MultipartForm::new()
            .add_text("title", "Orbital greenhouse")
            .add_text("fundingGoal", "250000.50")
            .add_text("duration", "45");

        let response = server
            .post("/api/submissions")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status_ok();

        let body: crate::api::models::submissions::SubmissionResponse = response.json();
        assert!(body.all_files_uploaded);

        let mut conn = pool.acquire().await.unwrap();
        let row = Submissions::new(&mut conn).get_by_id(body.submission_id).await.unwrap().unwrap();
        assert_eq!(row.status, "Pending");
        assert_eq!(row.title.as_deref(), Some("Orbital greenhouse"));
        assert_eq!(row.funding_goal, Some(rust_decimal::Decimal::new(250_000_50, 2)));
        assert_eq!(row.duration_days, Some(45));
        assert!(row.image_urls.is_empty());
        assert!(row.video_urls.is_empty());
        assert!(row.document_urls.is_empty());
    }
}
