//! Database layer: error categorization, models, and repositories.

pub mod embedded;
pub mod errors;
pub mod handlers;
pub mod models;
