use crate::app::ports::BlobStorePort;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Blob store backed by a local directory. Keys are relative paths under `root`.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path, refusing keys that would escape the root.
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(PipelineError::Storage {
                key: key.to_string(),
                message: "key must be a relative path inside the store".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStorePort for FsBlobStore {
    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        let target = self.object_path(key)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &target).await?;
        info!("File uploaded successfully: {}", target.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        let path = self.object_path(key)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PipelineError::Storage {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<()> {
        let source = self.object_path(key)?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&source, local_path)
            .await
            .map_err(|e| PipelineError::Storage {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        info!("Downloaded {} -> {}", key, local_path.display());
        Ok(())
    }
}
