//! Object storage configuration for product images.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider: `"local"` or `"s3"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum accepted size of a single image in bytes.
    #[serde(default = "default_max_image")]
    pub max_image_bytes: usize,
    /// Upper bound on a single upload, in seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_seconds: u64,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_image_bytes: default_max_image(),
            upload_timeout_seconds: default_upload_timeout(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory for stored objects.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// URL prefix under which the root directory is publicly served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// S3-compatible storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// AWS region.
    #[serde(default)]
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Public URL prefix for objects (CDN or bucket URL).
    #[serde(default)]
    pub public_base_url: String,
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_max_image() -> usize {
    5 * 1024 * 1024
}

fn default_upload_timeout() -> u64 {
    20
}

fn default_local_root() -> String {
    "./data/uploads".to_string()
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}
