// Adapters for external services: registry, research API and object storage

pub mod http_client;
pub mod registry_client;
pub mod research_client;
pub mod supabase_store;

use crate::app::ports::BlobStorePort;
use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::pipeline::storage::FsBlobStore;
use std::sync::Arc;
use supabase_store::SupabaseBlobStore;

/// Blob store selected by configuration.
pub fn build_blob_store(config: &Config) -> Result<Arc<dyn BlobStorePort>> {
    Ok(match config.storage.backend {
        StorageBackend::Fs => Arc::new(FsBlobStore::new(config.storage.root.clone())),
        StorageBackend::Supabase => Arc::new(SupabaseBlobStore::new(&config.storage)?),
    })
}
