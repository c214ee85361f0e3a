//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Set at creation only for the bootstrapped initial admin.
    pub admin_granted_at: Option<DateTime<Utc>>,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub admin_granted_at: Option<DateTime<Utc>>,
}

impl UserDBResponse {
    /// Admin status is defined by the grant timestamp being present.
    pub fn is_admin(&self) -> bool {
        self.admin_granted_at.is_some()
    }
}
