//! S3-compatible object storage provider.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, info};

use bazaar_core::config::storage::S3StorageConfig;
use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::traits::storage::ObjectStorage;

use super::{check_segment, public_url};

/// Stores objects in an S3 bucket. Credentials come from the standard
/// AWS provider chain.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3StorageProvider {
    /// Build a client from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(bucket = %config.bucket, region = %config.region, "Initializing S3 storage provider");

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if !config.region.is_empty() {
            loader = loader.region(aws_config::Region::new(config.region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let public_base_url = if config.public_base_url.is_empty() {
            format!("https://{}.s3.amazonaws.com", config.bucket)
        } else {
            config.public_base_url.trim_end_matches('/').to_string()
        };

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn put(
        &self,
        folder: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<String> {
        check_segment("folder", folder)?;
        check_segment("name", name)?;
        let key = format!("{folder}/{name}");
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to upload object: {key}"),
                    e,
                )
            })?;

        debug!(key, bytes = size, "Uploaded object");
        Ok(public_url(&self.public_base_url, folder, name))
    }

    async fn remove(&self, url: &str) -> AppResult<()> {
        let Some(key) = url
            .strip_prefix(&self.public_base_url)
            .and_then(|k| k.strip_prefix('/'))
        else {
            return Ok(());
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete object: {key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }
}
