//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Users** (`/api/users/*`): Registration, login, admin verification
//! - **Submissions** (`/api/submissions`): Mission proposal intake with media uploads
//! - **Approvals** (`/api/approvals/*`): Admin review of pending submissions
//! - **Health** (`/api/health`): Liveness check
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/api/docs` when the server is running.

pub mod handlers;
pub mod models;
