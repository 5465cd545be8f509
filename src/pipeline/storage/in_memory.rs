use crate::app::ports::BlobStorePort;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory blob store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the staging file.
    pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.lock().insert(key.to_string(), bytes.into());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still usable; the writer panicked between whole inserts
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn missing(key: &str) -> PipelineError {
        PipelineError::Storage {
            key: key.to_string(),
            message: "no such object".to_string(),
        }
    }
}

#[async_trait]
impl BlobStorePort for InMemoryBlobStore {
    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        let bytes = tokio::fs::read(local_path).await?;
        debug!("Stored {} bytes under {}", bytes.len(), key);
        self.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        let bytes = self.object(key).ok_or_else(|| Self::missing(key))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Storage {
            key: key.to_string(),
            message: format!("object is not UTF-8: {e}"),
        })
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<()> {
        let bytes = self.object(key).ok_or_else(|| Self::missing(key))?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local_path, bytes).await?;
        Ok(())
    }
}
