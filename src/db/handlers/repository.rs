//! Base repository trait for database operations.
//!
//! A repository is a data access layer for one postgres table, constructed
//! around a borrowed connection so it works inside or outside a transaction.
//! Entity-specific lookups (by email, by status, ...) live as inherent
//! methods on the concrete repositories.

use crate::db::errors::Result;

/// Base repository trait providing the operations every entity supports.
///
/// Separate associated types for create requests and responses keep the
/// wire-facing DTOs out of the database layer.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;
}
