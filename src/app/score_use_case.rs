use crate::app::ports::BlobStorePort;
use crate::constants::{
    DEFAULT_TARGET_CATEGORIES, SCORED_FILE_STEM, SCORED_KEY_FOLDER, SCORED_LOCAL_FOLDER, TOP_N,
};
use crate::error::Result;
use crate::pipeline::artifact::{self, ArtifactLayout};
use crate::pipeline::processing::score::{rank_records, TargetCategories};
use crate::types::StageReport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub const STAGE: &str = "score";
const LAYOUT: ArtifactLayout = ArtifactLayout {
    local_folder: SCORED_LOCAL_FOLDER,
    key_folder: SCORED_KEY_FOLDER,
};

/// Scores an enriched artifact against target categories and writes the
/// ranked list.
pub struct ScoreUseCase {
    store: Arc<dyn BlobStorePort>,
    staging_dir: PathBuf,
}

impl ScoreUseCase {
    pub fn new(store: Arc<dyn BlobStorePort>, staging_dir: PathBuf) -> Self {
        Self { store, staging_dir }
    }

    /// `target_categories` is a comma-separated list; `None` uses the default
    /// "Software Development,Cloud Services,service".
    #[instrument(skip(self))]
    pub async fn run(&self, key: &str, target_categories: Option<&str>) -> Result<StageReport> {
        let targets =
            TargetCategories::parse(target_categories.unwrap_or(DEFAULT_TARGET_CATEGORIES))?;
        crate::metrics::stage_started(STAGE);
        let started = Instant::now();

        let artifact_value = artifact::read_json(self.store.as_ref(), key).await?;
        let records = artifact::into_record_objects(
            key,
            artifact::artifact_records(key, artifact_value)?,
        );
        info!("Scoring {} companies against {:?}", records.len(), targets.as_slice());

        let ranked = rank_records(records, &targets);

        let file_name = artifact::timestamped_file_name(SCORED_FILE_STEM);
        let out_key = artifact::write_json(
            self.store.as_ref(),
            &self.staging_dir,
            LAYOUT,
            &file_name,
            &ranked,
        )
        .await?;

        crate::metrics::stage_finished(STAGE, ranked.len(), started.elapsed());
        let top = ranked.iter().take(TOP_N).cloned().collect();
        Ok(StageReport {
            message: "Companies scored and uploaded successfully".to_string(),
            s3_file: out_key,
            records_count: Some(ranked.len()),
            top_5_companies: Some(top),
        })
    }
}
