//! Local filesystem storage backend
//!
//! Writes objects under a configured root directory. Intended for development
//! and testing; URLs are formed from a configured base URL and handed back
//! unsigned.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;
use url::Url;

use crate::{
    config::LocalStorageConfig,
    storage::{ObjectStorage, Result, StorageError},
};

pub struct LocalStorage {
    root: PathBuf,
    base_url: Url,
}

impl LocalStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self {
            root: config.root,
            base_url: config.base_url,
        }
    }

    /// Resolve a key to a path under the root, rejecting traversal components
    fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let traversal = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if traversal || key.is_empty() {
            return Err(StorageError::Upload(format!("invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    fn object_url(&self, key: &str) -> Result<String> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::Upload("base_url cannot be a base".to_string()))?;
            segments.pop_if_empty();
            for segment in key.split('/') {
                segments.push(segment);
            }
        }
        Ok(url.to_string())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    #[instrument(skip(self, body), fields(root = %self.root.display()))]
    async fn put_object(&self, key: &str, _content_type: Option<&str>, body: Bytes) -> Result<String> {
        let path = self.path_for_key(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &body).await?;

        self.object_url(key)
    }

    async fn presigned_url(&self, url: &str) -> Result<String> {
        // Local files carry no credentials, nothing to sign
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_at(root: &Path) -> LocalStorage {
        LocalStorage::new(LocalStorageConfig {
            root: root.to_path_buf(),
            base_url: Url::parse("http://localhost:3000/uploads").unwrap(),
        })
    }

    #[tokio::test]
    async fn put_object_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let url = storage
            .put_object("images/test.png", Some("image/png"), Bytes::from_static(b"pngdata"))
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/uploads/images/test.png");

        let written = std::fs::read(dir.path().join("images/test.png")).unwrap();
        assert_eq!(written, b"pngdata");
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let result = storage
            .put_object("../escape.txt", None, Bytes::from_static(b"nope"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn presigned_url_is_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(dir.path());

        let url = "http://localhost:3000/uploads/images/test.png";
        assert_eq!(storage.presigned_url(url).await.unwrap(), url);
    }
}
