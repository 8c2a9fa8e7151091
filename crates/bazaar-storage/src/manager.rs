//! Storage provider selection.

use std::sync::Arc;

use tracing::info;

use bazaar_core::config::storage::StorageConfig;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::traits::storage::ObjectStorage;

use crate::providers::LocalStorageProvider;

/// Build the configured object storage provider.
pub async fn build_storage(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStorage>> {
    match config.provider.as_str() {
        "local" => {
            info!(root = %config.local.root_path, "Using local object storage");
            let provider = LocalStorageProvider::new(
                &config.local.root_path,
                &config.local.public_base_url,
            )
            .await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "s3")]
        "s3" => {
            let provider = crate::providers::s3::S3StorageProvider::new(&config.s3).await?;
            Ok(Arc::new(provider))
        }
        #[cfg(not(feature = "s3"))]
        "s3" => Err(AppError::configuration(
            "storage.provider = \"s3\" requires the `s3` feature",
        )),
        other => Err(AppError::configuration(format!(
            "Unknown storage provider: '{other}'. Supported: local, s3"
        ))),
    }
}
