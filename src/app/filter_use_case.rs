use crate::app::ports::BlobStorePort;
use crate::constants::{CLEAN_FILE_STEM, CLEAN_KEY_FOLDER, CLEAN_LOCAL_FOLDER};
use crate::error::Result;
use crate::pipeline::artifact::{self, ArtifactLayout};
use crate::pipeline::processing::filter::filter_records;
use crate::types::StageReport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub const STAGE: &str = "filter";
const LAYOUT: ArtifactLayout = ArtifactLayout {
    local_folder: CLEAN_LOCAL_FOLDER,
    key_folder: CLEAN_KEY_FOLDER,
};

/// Selects IT companies from a raw registry artifact and writes the
/// deduplicated, normalized list.
pub struct FilterUseCase {
    store: Arc<dyn BlobStorePort>,
    staging_dir: PathBuf,
}

impl FilterUseCase {
    pub fn new(store: Arc<dyn BlobStorePort>, staging_dir: PathBuf) -> Self {
        Self { store, staging_dir }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, key: &str) -> Result<StageReport> {
        crate::metrics::stage_started(STAGE);
        let started = Instant::now();

        let raw = artifact::read_json(self.store.as_ref(), key).await?;
        let records = artifact::artifact_records(key, raw)?;
        info!("Processing {} companies...", records.len());

        let cleaned = filter_records(&records);
        info!("{} of {} companies kept", cleaned.len(), records.len());

        let file_name = artifact::timestamped_file_name(CLEAN_FILE_STEM);
        let out_key = artifact::write_json(
            self.store.as_ref(),
            &self.staging_dir,
            LAYOUT,
            &file_name,
            &cleaned,
        )
        .await?;

        crate::metrics::stage_finished(STAGE, cleaned.len(), started.elapsed());
        Ok(StageReport {
            message: "Cleaned IT-related companies data saved and uploaded".to_string(),
            s3_file: out_key,
            records_count: Some(cleaned.len()),
            top_5_companies: None,
        })
    }
}
