use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::debug;

use crate::config::StorageConfig;
use crate::storage::ObjectStore;

/// Wrapper around AWS S3 client
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new S3 client using default AWS configuration
    pub async fn new() -> Result<Self> {
        Self::from_config(StorageConfig::default()).await
    }

    /// Create a client honouring endpoint, addressing and region overrides
    pub async fn from_config(config: StorageConfig) -> Result<Self> {
        let base_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        // Build S3-specific config
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&base_config);

        if let Some(endpoint) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        if let Some(region) = config.region {
            s3_config_builder = s3_config_builder.region(Region::new(region));
        }

        let client = Client::from_conf(s3_config_builder.build());
        Ok(S3Client { client })
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client) -> Self {
        S3Client { client }
    }

    /// Get an entire object's contents
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context(format!("Failed to get object s3://{}/{}", bucket, key))?;

        let bytes = resp
            .body
            .collect()
            .await
            .context("Failed to read object body")?
            .into_bytes();

        debug!(bucket, key, size = bytes.len(), "downloaded object");
        Ok(bytes)
    }

    /// Write an object
    pub async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .context(format!("Failed to put object s3://{}/{}", bucket, key))?;

        Ok(())
    }

    /// Delete an object (succeeds when the key is already gone)
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context(format!("Failed to delete object s3://{}/{}", bucket, key))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.get_object(bucket, key).await
    }

    async fn upload(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        self.put_object(bucket, key, body).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_object(bucket, key).await
    }
}
