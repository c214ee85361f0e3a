//! Database error categorization.
//!
//! Repository methods return [`DbError`] so handlers can react to the two
//! recoverable cases this service actually has (a missing row, a duplicate
//! registration) without matching on raw `sqlx::Error` values.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// No row matched the given identifier
    #[error("Entity not found")]
    NotFound,

    /// A unique constraint rejected the write. For this schema that means a
    /// duplicate email or username on the users table.
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Anything else: connection loss, bad SQL, pool exhaustion. Not
    /// recoverable by the handler, surfaces as an internal error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::UniqueViolation {
                constraint: db_err.constraint().map(str::to_string),
                table: db_err.table().map(str::to_string),
                message: db_err.message().to_string(),
            },
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
