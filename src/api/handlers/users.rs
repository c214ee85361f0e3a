//! Registration, login, and admin verification handlers.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::models::users::{AdminStatusResponse, CurrentUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    auth::{
        password::{self, Argon2Params},
        session,
    },
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
    AppState,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    tag = "users",
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already in use"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    if request.username.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username and email are required".to_string(),
        });
    }

    // Validate password length
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // Pre-check both identifiers; the unique constraints are the backstop
    if user_repo.exists_by_email_or_username(&request.email, &request.username).await? {
        return Err(Error::Conflict {
            message: "User with this email or username already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let params = Argon2Params {
        memory_kib: password_config.argon2_memory_kib,
        iterations: password_config.argon2_iterations,
        parallelism: password_config.argon2_parallelism,
    };
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        username: request.username,
        email: request.email,
        password_hash,
        admin_granted_at: None,
    };

    let created_user = user_repo.create(&create_request).await?;
    tracing::info!("User registered: {}", created_user.email);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".to_string(),
            user_id: created_user.id,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    tag = "users",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // Unknown email and wrong password must be indistinguishable to the caller
    let user = user_repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin(),
    };
    let token = session::create_session_token(&current_user, &state.config)?;
    tracing::info!("User logged in: {}", user.email);

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        message: "Login successful!".to_string(),
    }))
}

/// Verify whether the calling user holds admin privileges
///
/// The admin grant is checked against the users table on every call so a
/// stale or forged role claim in the token never grants access.
#[utoipa::path(
    get,
    path = "/api/users/verify-admin",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller is an admin", body = AdminStatusResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn verify_admin(State(state): State<AppState>, user: CurrentUser) -> Result<Json<AdminStatusResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let granted_at = Users::new(&mut conn).admin_granted_at(user.id).await?;

    match granted_at {
        Some(granted_at) => {
            tracing::info!("User {} confirmed as admin", user.id);
            Ok(Json(AdminStatusResponse {
                is_admin: true,
                granted_at,
            }))
        }
        None => Err(Error::Forbidden {
            message: "User does not have administrative privileges".to_string(),
        }),
    }
}
