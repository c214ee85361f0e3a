//! In-memory storage backend for tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use crate::storage::{ObjectStorage, Result, StorageError};

/// Test double that records stored objects and can be told to fail uploads
/// whose key contains a marker substring.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<Vec<(String, Bytes)>>,
    pub fail_keys_containing: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            fail_keys_containing: Some(marker.to_string()),
        }
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(&self, key: &str, _content_type: Option<&str>, body: Bytes) -> Result<String> {
        if let Some(marker) = &self.fail_keys_containing {
            if key.contains(marker.as_str()) {
                return Err(StorageError::Upload(format!("simulated failure for {key}")));
            }
        }

        self.objects.lock().unwrap().push((key.to_string(), body));
        Ok(format!("memory://bucket/{key}"))
    }

    async fn presigned_url(&self, url: &str) -> Result<String> {
        match url.strip_prefix("memory://bucket/") {
            Some(key) => Ok(format!("memory://bucket/{key}?signed=true")),
            None => Ok(url.to_string()),
        }
    }
}
