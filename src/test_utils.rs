//! Test utilities for DB-backed tests (available with the `test-utils` feature).
//!
//! The `#[sqlx::test]` harness hands each test a fresh migrated database;
//! these helpers build the state, server, users, and tokens around that pool.

use crate::{
    api::models::users::CurrentUser,
    auth::{
        password::{self, Argon2Params},
        session,
    },
    config::{AuthConfig, Config, PasswordConfig},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    storage::memory::MemoryStorage,
    AppState,
};
use axum_test::TestServer;
use sqlx::PgPool;
use std::sync::Arc;

/// Password every test user is created with.
pub const TEST_PASSWORD: &str = "ad-astra-per-aspera";

/// Hashing costs low enough that test users are cheap to mint.
const TEST_ARGON2: Argon2Params = Argon2Params {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

pub fn create_test_config() -> Config {
    Config {
        auth: AuthConfig {
            jwt_secret: Some("test-secret-key-for-testing-only".to_string()),
            password: PasswordConfig {
                argon2_memory_kib: TEST_ARGON2.memory_kib,
                argon2_iterations: TEST_ARGON2.iterations,
                argon2_parallelism: TEST_ARGON2.parallelism,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// App state over the test pool, with in-memory object storage.
pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder()
        .db(pool)
        .config(create_test_config())
        .storage(Arc::new(MemoryStorage::new()))
        .build()
}

pub fn create_test_server(pool: PgPool) -> TestServer {
    let router = crate::build_router(create_test_state(pool)).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Insert a user through the repository. Email is `<username>@example.com`,
/// password is [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, username: &str, admin: bool) -> UserDBResponse {
    let password_hash = password::hash_password_with_params(TEST_PASSWORD, Some(TEST_ARGON2)).expect("Failed to hash test password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
            admin_granted_at: admin.then(chrono::Utc::now),
        })
        .await
        .expect("Failed to create test user")
}

/// A session token for the given user, signed with the test config's secret.
pub fn bearer_token_for(user: &UserDBResponse, config: &Config) -> String {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin(),
    };
    session::create_session_token(&current, config).expect("Failed to create session token")
}
