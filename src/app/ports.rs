use crate::error::{EnrichmentError, Result};
use crate::types::{EnrichmentData, Record, RegistryResponse};
use async_trait::async_trait;
use std::path::Path;

/// Opaque key/value blob store holding pipeline artifacts.
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Upload the file at `local_path` under `key`.
    async fn put(&self, local_path: &Path, key: &str) -> Result<()>;
    /// Read the object at `key` as UTF-8 text.
    async fn get(&self, key: &str) -> Result<String>;
    /// Copy the object at `key` into `local_path`.
    async fn download(&self, key: &str, local_path: &Path) -> Result<()>;
}

#[async_trait]
pub trait RegistryPort: Send + Sync {
    /// Fetch one page of companies registered in `region_code`.
    async fn fetch_companies(&self, region_code: &str) -> Result<RegistryResponse>;
}

#[async_trait]
pub trait ResearchPort: Send + Sync {
    /// Look up structured attributes for a company record.
    async fn research(
        &self,
        record: &Record,
    ) -> std::result::Result<EnrichmentData, EnrichmentError>;
}
