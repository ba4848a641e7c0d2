//! S3-backed object store via OpenDAL.

use async_trait::async_trait;
use bytes::Bytes;
use opendal::services::S3;
use opendal::Operator;
use tracing::debug;

use super::{object_key, ObjectStore, ObjectStoreConfig, ObjectStoreError, ObjectStoreResult};

/// Stores listing images in an S3 bucket.
pub struct S3ObjectStore {
    operator: Operator,
    config: ObjectStoreConfig,
}

impl S3ObjectStore {
    pub fn new(config: ObjectStoreConfig) -> ObjectStoreResult<Self> {
        let builder = S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key);

        let operator = Operator::new(builder)
            .map_err(|e| ObjectStoreError::Configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, config })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
        listing_id: i64,
    ) -> ObjectStoreResult<String> {
        let key = object_key(listing_id, original_name);
        debug!(key = %key, bytes = data.len(), "uploading listing image");
        self.operator
            .write_with(&key, data)
            .content_type(content_type)
            .await
            .map_err(|e| ObjectStoreError::Upload(e.to_string()))?;
        Ok(self.config.public_url(&key))
    }

    async fn delete(&self, url: &str) -> ObjectStoreResult<()> {
        let key = self.config.key_for_url(url).ok_or_else(|| {
            ObjectStoreError::Delete(format!("URL does not belong to this bucket: {}", url))
        })?;
        debug!(key = %key, "deleting listing image");
        self.operator
            .delete(&key)
            .await
            .map_err(|e| ObjectStoreError::Delete(e.to_string()))
    }
}
