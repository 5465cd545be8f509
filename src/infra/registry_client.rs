use crate::app::ports::RegistryPort;
use crate::config::RegistryConfig;
use crate::constants::REGISTRY_REGION_FILTER;
use crate::error::Result;
use crate::infra::http_client::build_client;
use crate::types::RegistryResponse;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Client for the government company registry (data.gov.in resource API).
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            client: build_client(config.timeout_seconds.map(Duration::from_secs))?,
            base_url: config.base_url.clone(),
            api_key,
            page_size: config.page_size,
        })
    }
}

#[async_trait]
impl RegistryPort for RegistryClient {
    #[instrument(skip(self))]
    async fn fetch_companies(&self, region_code: &str) -> Result<RegistryResponse> {
        let page_size = self.page_size.to_string();
        let params = [
            ("api-key", self.api_key.as_str()),
            ("format", "json"),
            (REGISTRY_REGION_FILTER, region_code),
            ("limit", page_size.as_str()),
        ];

        let resp = self.client.get(&self.base_url).query(&params).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        if status == 200 {
            info!("Registry returned {} bytes for region {}", body.len(), region_code);
        } else {
            warn!("Registry responded with status {} for region {}", status, region_code);
        }
        Ok(RegistryResponse { status, body })
    }
}
