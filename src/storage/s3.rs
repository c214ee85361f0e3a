//! S3-compatible storage backend
//!
//! Works against AWS S3 as well as S3-compatible services (iDrive E2,
//! Backblaze B2, MinIO) via a custom endpoint URL and path-style addressing.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use bytes::Bytes;
use std::time::Duration;
use tracing::instrument;

use crate::{
    config::S3StorageConfig,
    storage::{ObjectStorage, Result, StorageError},
};

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    /// Endpoint with any trailing slash removed, used to build object URLs
    endpoint: String,
    /// Optional public prefix (CDN, Backblaze friendly URL) recorded instead
    /// of the path-style endpoint form
    public_base: Option<String>,
    public_read: bool,
    presign_expiry: Duration,
}

impl S3Storage {
    pub fn new(config: S3StorageConfig) -> Self {
        let credentials = Credentials::from_keys(&config.access_key, &config.secret_key, None);
        let endpoint = config.endpoint_url.as_str().trim_end_matches('/').to_string();
        let public_base = config.public_url.as_ref().map(|u| u.as_str().trim_end_matches('/').to_string());

        let sdk_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            // Path-style addressing is required by most S3-compatible services
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(sdk_config),
            bucket: config.bucket,
            endpoint,
            public_base,
            public_read: config.public_read,
            presign_expiry: config.presign_expiry,
        }
    }

    /// URL recorded for a stored object: the public prefix when one is
    /// configured, the path-style endpoint form otherwise
    fn object_url(&self, key: &str) -> String {
        match &self.public_base {
            Some(base) => format!("{base}/{key}"),
            None => format!("{}/{}/{}", self.endpoint, self.bucket, key),
        }
    }

    /// Recover the object key from a stored URL, if the URL belongs to this
    /// provider (public prefix or endpoint/bucket form)
    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        if let Some(base) = &self.public_base {
            if let Some(key) = url.strip_prefix(format!("{base}/").as_str()).filter(|key| !key.is_empty()) {
                return Some(key);
            }
        }
        let prefix = format!("{}/{}/", self.endpoint, self.bucket);
        url.strip_prefix(prefix.as_str()).filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[instrument(skip(self, body), fields(bucket = %self.bucket))]
    async fn put_object(&self, key: &str, content_type: Option<&str>, body: Bytes) -> Result<String> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(self.object_url(key))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presigned_url(&self, url: &str) -> Result<String> {
        let Some(key) = self.key_for_url(url) else {
            // Not one of ours: hand the URL back untouched
            return Ok(url.to_string());
        };

        let presigning = PresigningConfig::expires_in(self.presign_expiry).map_err(|e| StorageError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn test_config() -> S3StorageConfig {
        S3StorageConfig {
            access_key: "AKIA123".to_string(),
            secret_key: "shhh".to_string(),
            endpoint_url: Url::parse("https://u4p1.ldn.idrivee2-60.com/").unwrap(),
            region: "us-east-1".to_string(),
            bucket: "orbitfund-media".to_string(),
            public_url: None,
            public_read: false,
            presign_expiry: Duration::from_secs(900),
        }
    }

    fn test_storage() -> S3Storage {
        S3Storage::new(test_config())
    }

    #[test]
    fn object_url_is_path_style_without_double_slash() {
        let storage = test_storage();
        assert_eq!(
            storage.object_url("images/abc.png"),
            "https://u4p1.ldn.idrivee2-60.com/orbitfund-media/images/abc.png"
        );
    }

    #[test]
    fn key_round_trips_through_url() {
        let storage = test_storage();
        let url = storage.object_url("documents/xyz.pdf");
        assert_eq!(storage.key_for_url(&url), Some("documents/xyz.pdf"));
    }

    #[test]
    fn public_url_prefix_replaces_the_endpoint_form() {
        let storage = S3Storage::new(S3StorageConfig {
            public_url: Some(Url::parse("https://media.orbitfund.example/").unwrap()),
            ..test_config()
        });

        let url = storage.object_url("images/abc.png");
        assert_eq!(url, "https://media.orbitfund.example/images/abc.png");
        assert_eq!(storage.key_for_url(&url), Some("images/abc.png"));

        // Objects stored before the prefix was configured still resolve
        let legacy = "https://u4p1.ldn.idrivee2-60.com/orbitfund-media/images/old.png";
        assert_eq!(storage.key_for_url(legacy), Some("images/old.png"));
    }

    #[test]
    fn foreign_urls_are_not_recognized() {
        let storage = test_storage();
        assert_eq!(storage.key_for_url("https://other.example.com/orbitfund-media/images/abc.png"), None);
        // Same endpoint, different bucket
        assert_eq!(storage.key_for_url("https://u4p1.ldn.idrivee2-60.com/other-bucket/images/abc.png"), None);
        // Bucket root with no key
        assert_eq!(storage.key_for_url("https://u4p1.ldn.idrivee2-60.com/orbitfund-media/"), None);
    }
}
