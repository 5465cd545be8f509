use crate::app::ports::{BlobStorePort, ResearchPort};
use crate::constants::{
    ENRICHED_FILE_STEM, ENRICHED_KEY_FOLDER, ENRICHED_LOCAL_FOLDER, ENRICHMENT_QUOTA,
};
use crate::error::Result;
use crate::pipeline::artifact::{self, ArtifactLayout};
use crate::pipeline::processing::enrich::enrich_record;
use crate::types::StageReport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub const STAGE: &str = "enrich";
const LAYOUT: ArtifactLayout = ArtifactLayout {
    local_folder: ENRICHED_LOCAL_FOLDER,
    key_folder: ENRICHED_KEY_FOLDER,
};

/// Enriches the leading records of a cleaned artifact with research data.
pub struct EnrichUseCase {
    research: Arc<dyn ResearchPort>,
    store: Arc<dyn BlobStorePort>,
    staging_dir: PathBuf,
    quota: usize,
}

impl EnrichUseCase {
    pub fn new(
        research: Arc<dyn ResearchPort>,
        store: Arc<dyn BlobStorePort>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            research,
            store,
            staging_dir,
            quota: ENRICHMENT_QUOTA,
        }
    }

    /// Only the first `quota` records are researched and written; the rest of
    /// the input is left out of the output. Calls are made one at a time.
    #[instrument(skip(self))]
    pub async fn run(&self, key: &str) -> Result<StageReport> {
        crate::metrics::stage_started(STAGE);
        let started = Instant::now();

        let artifact_value = artifact::read_json(self.store.as_ref(), key).await?;
        let mut records = artifact::artifact_records(key, artifact_value)?;
        records.truncate(self.quota);
        let sample = artifact::into_record_objects(key, records);
        info!("Enriching {} companies...", sample.len());

        let mut enriched = Vec::with_capacity(sample.len());
        for record in sample {
            enriched.push(enrich_record(self.research.as_ref(), record).await);
        }

        let file_name = artifact::timestamped_file_name(ENRICHED_FILE_STEM);
        let out_key = artifact::write_json(
            self.store.as_ref(),
            &self.staging_dir,
            LAYOUT,
            &file_name,
            &enriched,
        )
        .await?;

        crate::metrics::stage_finished(STAGE, enriched.len(), started.elapsed());
        Ok(StageReport {
            message: "Business Services data enriched with Perplexity saved and uploaded"
                .to_string(),
            s3_file: out_key,
            records_count: Some(enriched.len()),
            top_5_companies: None,
        })
    }
}
