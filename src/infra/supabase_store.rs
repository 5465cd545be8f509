use crate::app::ports::BlobStorePort;
use crate::config::StorageConfig;
use crate::error::{PipelineError, Result};
use crate::infra::http_client::build_client;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use tracing::info;

/// Blob store on Supabase Storage. Objects live at `<prefix>/<key>` in `bucket`
/// and are written with `upsert=true`.
pub struct SupabaseBlobStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    prefix: Option<String>,
    service_role_key: String,
}

impl SupabaseBlobStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let missing = |name: &str| PipelineError::Config(format!("{name} is not set"));
        let base_url = config
            .supabase_url
            .clone()
            .ok_or_else(|| missing("SUPABASE_URL"))?;
        let bucket = config.bucket.clone().ok_or_else(|| missing("SUPABASE_BUCKET"))?;
        let service_role_key = config
            .service_role_key
            .clone()
            .ok_or_else(|| missing("SUPABASE_SERVICE_ROLE_KEY"))?;
        Ok(Self {
            client: build_client(None)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            prefix: config.prefix.clone(),
            service_role_key,
        })
    }

    fn object_path(&self, key: &str) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}/{}", prefix.trim_end_matches('/'), key)
            }
            _ => key.to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            self.object_path(key)
        )
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("apikey", self.service_role_key.clone())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Storage {
                key: key.to_string(),
                message: format!("fetch failed: {} - {}", status, body),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl BlobStorePort for SupabaseBlobStore {
    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        let bytes = tokio::fs::read(local_path).await?;
        let resp = self
            .client
            .put(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("apikey", self.service_role_key.clone())
            .header(CONTENT_TYPE, "application/json")
            .query(&[("upsert", "true")])
            .body(bytes)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Storage {
                key: key.to_string(),
                message: format!("upload failed: {} - {}", status, body),
            });
        }
        info!("File uploaded successfully: {}/{}", self.bucket, self.object_path(key));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String> {
        let bytes = self.fetch(key).await?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Storage {
            key: key.to_string(),
            message: format!("object is not UTF-8: {e}"),
        })
    }

    async fn download(&self, key: &str, local_path: &Path) -> Result<()> {
        let bytes = self.fetch(key).await?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local_path, bytes).await?;
        info!("Downloaded {}/{} -> {}", self.bucket, key, local_path.display());
        Ok(())
    }
}
