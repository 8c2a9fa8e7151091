//! Local filesystem storage provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::traits::storage::ObjectStorage;

use super::{check_segment, public_url};

/// Stores objects under a root directory that the API serves statically.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory.
    pub async fn new(root_path: impl AsRef<Path>, public_base_url: &str) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a public URL back to a path under the root, if it is one of ours.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.public_base_url)?.strip_prefix('/')?;
        let (folder, name) = rest.split_once('/')?;
        if check_segment("folder", folder).is_err() || check_segment("name", name).is_err() {
            return None;
        }
        Some(self.root.join(folder).join(name))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
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

        let dir = self.root.join(folder);
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", dir.display()),
                e,
            )
        })?;

        let path = dir.join(name);
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {folder}/{name}"),
                e,
            )
        })?;

        debug!(folder, name, content_type, bytes = data.len(), "Stored object");
        Ok(public_url(&self.public_base_url, folder, name))
    }

    async fn remove(&self, url: &str) -> AppResult<()> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove object: {url}"),
                e,
            )),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider(dir: &tempfile::TempDir) -> LocalStorageProvider {
        LocalStorageProvider::new(dir.path(), "/uploads/").await.unwrap()
    }

    #[tokio::test]
    async fn test_put_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = provider(&dir).await;

        let url = storage
            .put("products", "a.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(url, "/uploads/products/a.png");
        let written = std::fs::read(dir.path().join("products/a.png")).unwrap();
        assert_eq!(written, b"png");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = provider(&dir).await;
        let data = Bytes::from_static(b"x");

        assert!(storage.put("..", "a.png", "image/png", data.clone()).await.is_err());
        assert!(storage.put("products", "../a.png", "image/png", data).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_own_and_ignore_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let storage = provider(&dir).await;
        let url = storage
            .put("products", "b.jpg", "image/jpeg", Bytes::from_static(b"jpg"))
            .await
            .unwrap();

        storage.remove(&url).await.unwrap();
        assert!(!dir.path().join("products/b.jpg").exists());

        storage.remove(&url).await.unwrap();
        storage.remove("https://cdn.example.com/x.png").await.unwrap();
        assert!(storage.health_check().await.unwrap());
    }
}
