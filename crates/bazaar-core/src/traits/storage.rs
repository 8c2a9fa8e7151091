//! Object storage trait for product images.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// A blob store that hands back public URLs.
///
/// The core only ever keeps the returned URL; providers own the mapping
/// from `(folder, name)` to a physical location.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Provider type identifier (e.g. `"local"`, `"s3"`).
    fn provider_type(&self) -> &str;

    /// Store `data` under `folder/name` and return its public URL.
    async fn put(
        &self,
        folder: &str,
        name: &str,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<String>;

    /// Remove a previously stored object by its public URL.
    ///
    /// Unknown URLs are ignored.
    async fn remove(&self, url: &str) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
