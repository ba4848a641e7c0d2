//! Object storage for listing images.
//!
//! Images live in an S3 bucket under `listings/<listing_id>/<uuid>.<ext>`;
//! the database only stores the resulting public URL. [`ObjectStore`] is the
//! seam the HTTP layer talks to, with [`s3::S3ObjectStore`] as the real
//! implementation.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub mod s3;

pub use s3::S3ObjectStore;

/// Errors from object storage operations.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("Object store configuration error: {0}")]
    Configuration(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// S3 connection settings.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl ObjectStoreConfig {
    /// Read settings from the environment. Returns `None` when no bucket is
    /// configured, in which case image upload is disabled.
    pub fn from_env() -> ObjectStoreResult<Option<Self>> {
        let bucket = match std::env::var("AWS_S3_BUCKET") {
            Ok(b) if !b.is_empty() => b,
            _ => return Ok(None),
        };
        let region = std::env::var("AWS_S3_REGION").unwrap_or_else(|_| "us-west-1".to_string());
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").map_err(|_| {
            ObjectStoreError::Configuration("AWS_ACCESS_KEY_ID must be set".to_string())
        })?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            ObjectStoreError::Configuration("AWS_SECRET_ACCESS_KEY must be set".to_string())
        })?;
        Ok(Some(Self {
            bucket,
            region,
            access_key_id,
            secret_access_key,
        }))
    }

    /// Public URL for a stored object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key)
    }

    /// Recover the object key from a public URL, if the URL belongs to this
    /// bucket.
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        let prefix = format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region);
        url.strip_prefix(prefix.as_str())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

/// Build a fresh object key for an upload. The original filename only
/// contributes its extension; unknown extensions fall back to `jpg`.
pub fn object_key(listing_id: i64, original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_lowercase)
        .unwrap_or_else(|| "jpg".to_string());
    format!("listings/{}/{}.{}", listing_id, Uuid::new_v4(), ext)
}

/// Upload and delete of listing images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the bytes and return the public URL.
    async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
        listing_id: i64,
    ) -> ObjectStoreResult<String>;

    /// Remove the object behind a public URL previously returned by
    /// [`ObjectStore::upload`].
    async fn delete(&self, url: &str) -> ObjectStoreResult<()>;
}
