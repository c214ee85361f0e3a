//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`users`]: Registration, login, and admin verification
//! - [`submissions`]: Mission proposal intake with multipart media uploads
//! - [`approvals`]: Admin review surface for pending submissions
//! - [`health`]: Liveness check
//!
//! # Authentication
//!
//! Protected handlers take the [`crate::api::models::users::CurrentUser`] or
//! [`crate::auth::current_user::AdminUser`] extractor, which authenticate the
//! request from the `Authorization: Bearer` header.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes with internals kept out of the response body.

pub mod approvals;
pub mod health;
pub mod submissions;
pub mod users;
