use crate::db::errors::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided or invalid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated but not allowed to perform the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Duplicate resource, e.g. registering an email twice
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => {
                message.clone().unwrap_or_else(|| "Authentication required".to_string())
            }
            Error::Forbidden { message } => message.clone(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, table, .. } => {
                    match (table.as_deref(), constraint.as_deref()) {
                        (Some("users"), Some(c)) if c.contains("email") => {
                            "An account with this email address already exists".to_string()
                        }
                        (Some("users"), Some(c)) if c.contains("username") => {
                            "This username is already taken".to_string()
                        }
                        _ => "Resource already exists".to_string(),
                    }
                }
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        let e = Error::Unauthenticated { message: None };
        assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);

        let e = Error::Forbidden {
            message: "admin only".into(),
        };
        assert_eq!(e.status_code(), StatusCode::FORBIDDEN);

        let e = Error::NotFound {
            resource: "Submission".into(),
            id: "42".into(),
        };
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(e.user_message(), "Submission with ID 42 not found");

        let e = Error::Database(DbError::NotFound);
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unique_violations_map_to_conflict_with_friendly_message() {
        let e = Error::Database(DbError::UniqueViolation {
            constraint: Some("users_email_unique".into()),
            table: Some("users".into()),
            message: "duplicate key value violates unique constraint".into(),
        });
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(e.user_message(), "An account with this email address already exists");

        let e = Error::Database(DbError::UniqueViolation {
            constraint: Some("users_username_unique".into()),
            table: Some("users".into()),
            message: "duplicate key value violates unique constraint".into(),
        });
        assert_eq!(e.user_message(), "This username is already taken");
    }

    #[test]
    fn internal_errors_never_leak_detail() {
        let e = Error::Internal {
            operation: "connect to db at 10.0.0.3:5432".into(),
        };
        assert_eq!(e.user_message(), "Internal server error");

        let e = Error::Other(anyhow::anyhow!("secret detail"));
        assert_eq!(e.user_message(), "Internal server error");
    }
}
