//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! API models are distinct from database models so the wire representation and
//! the storage representation can evolve independently. All models are
//! annotated with `utoipa` for automatic API docs.
//!
//! - [`users`]: Registration, login, and admin verification payloads
//! - [`submissions`]: Mission proposal intake and review payloads

pub mod submissions;
pub mod users;
