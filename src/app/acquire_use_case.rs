use crate::app::ports::{BlobStorePort, RegistryPort};
use crate::constants::{RAW_KEY_FOLDER, RAW_LOCAL_FOLDER};
use crate::error::Result;
use crate::pipeline::artifact::{self, ArtifactLayout};
use crate::types::{AcquireOutcome, StageReport};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub const STAGE: &str = "acquire";
const LAYOUT: ArtifactLayout = ArtifactLayout {
    local_folder: RAW_LOCAL_FOLDER,
    key_folder: RAW_KEY_FOLDER,
};

/// Captures one registry page for a region, verbatim, as a raw artifact.
pub struct AcquireUseCase {
    registry: Arc<dyn RegistryPort>,
    store: Arc<dyn BlobStorePort>,
    staging_dir: PathBuf,
}

/// Region codes go into file names; keep them to a safe alphabet.
fn file_safe(region_code: &str) -> String {
    region_code
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

impl AcquireUseCase {
    pub fn new(
        registry: Arc<dyn RegistryPort>,
        store: Arc<dyn BlobStorePort>,
        staging_dir: PathBuf,
    ) -> Self {
        Self { registry, store, staging_dir }
    }

    /// Fetch and store. A registry that is unreachable or answers anything but
    /// 200 yields `AcquireOutcome::Rejected`; nothing is written and nothing is
    /// retried.
    #[instrument(skip(self))]
    pub async fn run(&self, region_code: &str) -> Result<AcquireOutcome> {
        crate::metrics::stage_started(STAGE);
        let started = Instant::now();

        let response = match self.registry.fetch_companies(region_code).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Registry request failed: {}", e);
                crate::metrics::registry_rejected("transport");
                return Ok(AcquireOutcome::Rejected { error: e.to_string() });
            }
        };
        if response.status != 200 {
            crate::metrics::registry_rejected(&response.status.to_string());
            return Ok(AcquireOutcome::Rejected { error: response.body });
        }

        // The body is stored untouched; parsing only confirms it is JSON
        let parsed: Value = serde_json::from_str(&response.body)?;
        let record_count = parsed
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        let file_name =
            artifact::timestamped_file_name(&format!("companies_{}", file_safe(region_code)));
        info!("Uploading {} registry records to storage...", record_count);
        let key = artifact::write_bytes(
            self.store.as_ref(),
            &self.staging_dir,
            LAYOUT,
            &file_name,
            response.body.as_bytes(),
        )
        .await?;
        info!("Upload finished");

        crate::metrics::stage_finished(STAGE, record_count, started.elapsed());
        Ok(AcquireOutcome::Stored(StageReport {
            message: "Data fetched and saved to storage".to_string(),
            s3_file: key,
            records_count: None,
            top_5_companies: None,
        }))
    }
}
