use crate::app::acquire_use_case::{self, AcquireUseCase};
use crate::app::enrich_use_case::{self, EnrichUseCase};
use crate::app::filter_use_case::{self, FilterUseCase};
use crate::app::ports::BlobStorePort;
use crate::app::score_use_case::{self, ScoreUseCase};
use crate::config::Config;
use crate::error::Result;
use crate::infra::build_blob_store;
use crate::infra::registry_client::RegistryClient;
use crate::infra::research_client::ResearchClient;
use crate::types::{AcquireOutcome, StageReport};
use std::sync::Arc;
use tracing::error;

/// Count a stage error once, whichever step of the stage raised it.
fn observe<T>(stage: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!(stage, "Stage failed: {}", e);
        crate::metrics::stage_failed(stage);
    }
    result
}

/// Entry points for the four stages, wired from configuration.
///
/// External clients are built per invocation so that stages which never call
/// the registry or the research API do not need their keys.
#[derive(Clone)]
pub struct Stages {
    config: Arc<Config>,
    store: Arc<dyn BlobStorePort>,
}

impl Stages {
    pub fn from_config(config: Config) -> Result<Self> {
        let store = build_blob_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn BlobStorePort>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn acquire(&self, region_code: &str) -> Result<AcquireOutcome> {
        let result = match RegistryClient::new(&self.config.registry) {
            Ok(registry) => {
                AcquireUseCase::new(
                    Arc::new(registry),
                    self.store.clone(),
                    self.config.staging_dir.clone(),
                )
                .run(region_code)
                .await
            }
            Err(e) => Err(e),
        };
        observe(acquire_use_case::STAGE, result)
    }

    pub async fn filter(&self, key: &str) -> Result<StageReport> {
        let result = FilterUseCase::new(self.store.clone(), self.config.staging_dir.clone())
            .run(key)
            .await;
        observe(filter_use_case::STAGE, result)
    }

    pub async fn enrich(&self, key: &str) -> Result<StageReport> {
        let result = match ResearchClient::new(&self.config.research) {
            Ok(research) => {
                EnrichUseCase::new(
                    Arc::new(research),
                    self.store.clone(),
                    self.config.staging_dir.clone(),
                )
                .run(key)
                .await
            }
            Err(e) => Err(e),
        };
        observe(enrich_use_case::STAGE, result)
    }

    pub async fn score(&self, key: &str, target_categories: Option<&str>) -> Result<StageReport> {
        let result = ScoreUseCase::new(self.store.clone(), self.config.staging_dir.clone())
            .run(key, target_categories)
            .await;
        observe(score_use_case::STAGE, result)
    }
}
