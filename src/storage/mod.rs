//! Object storage abstraction layer
//!
//! This module defines the `ObjectStorage` trait which abstracts media storage
//! across different backends (S3-compatible services, local filesystem).

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::StorageConfig;

pub mod local;
pub mod s3;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

/// Create a storage provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new backend requires adding a match arm here.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    match config {
        StorageConfig::S3(s3_config) => Arc::new(s3::S3Storage::new(s3_config.clone())),
        StorageConfig::Local(local_config) => Arc::new(local::LocalStorage::new(local_config.clone())),
    }
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while talking to the storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to store object: {0}")]
    Upload(String),

    #[error("Failed to sign URL: {0}")]
    Presign(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for crate::errors::Error {
    fn from(err: StorageError) -> Self {
        crate::errors::Error::Internal {
            operation: format!("storage operation: {err}"),
        }
    }
}

/// Abstract object storage interface
///
/// Implementors persist uploaded submission media and hand out time-limited
/// read URLs for the review surface.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object under the given key.
    ///
    /// Returns the URL recorded in the database for this object.
    async fn put_object(&self, key: &str, content_type: Option<&str>, body: Bytes) -> Result<String>;

    /// Produce a time-limited read URL for a previously stored object URL.
    ///
    /// URLs that do not belong to this provider are returned unchanged.
    async fn presigned_url(&self, url: &str) -> Result<String>;
}

/// Build a unique object key for an uploaded file: `<folder>/<uuid><ext>`.
///
/// The original file name contributes only its extension; the file is stored
/// under a fresh UUID so uploads can never collide or overwrite each other.
pub fn object_key(folder: &str, original_file_name: &str) -> String {
    let extension = Path::new(original_file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    format!("{folder}/{}{extension}", Uuid::new_v4())
}
