//! Database repository for users.

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    types::UserId,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub admin_granted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
            admin_granted_at: user.admin_granted_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Find a user by email (login path).
    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user.map(UserDBResponse::from))
    }

    /// Check whether either the email or the username is already taken.
    /// Used as the registration pre-check; the unique constraints backstop it.
    #[instrument(skip_all, err)]
    pub async fn exists_by_email_or_username(&mut self, email: &str, username: &str) -> Result<bool> {
        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE email = $1 OR username = $2")
            .bind(email)
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(id.is_some())
    }

    /// Fetch the admin grant timestamp for a user, straight from the table.
    /// Authorization decisions rely on this rather than on token claims.
    #[instrument(skip(self), err)]
    pub async fn admin_granted_at(&mut self, id: UserId) -> Result<Option<DateTime<Utc>>> {
        let granted = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT admin_granted_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        // Outer None: no such user. Inner None: user exists, not an admin.
        Ok(granted.flatten())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, admin_granted_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.admin_granted_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user.map(UserDBResponse::from))
    }
}
