use crate::app::ports::ResearchPort;
use crate::config::ResearchConfig;
use crate::error::{EnrichmentError, PipelineError, Result};
use crate::infra::http_client::build_client;
use crate::pipeline::processing::research_response::parse_research_content;
use crate::types::{EnrichmentData, Record};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat-completions client used to research companies.
pub struct ResearchClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize, Default)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize, Default)]
struct Choice {
    #[serde(default)]
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize, Default)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletion {
    /// `choices[0].message.content`, or "" when any part is missing
    fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}

/// Build the deep-research prompt around the serialized record.
pub fn research_prompt(record: &Record) -> String {
    let context = serde_json::to_string(record).unwrap_or_default();
    format!(
        r#"Do a deep research and provide a concise JSON output for [{context}] with only these fields. 
Return the response *strictly* in this JSON format without extra explanation:
{{
    "size": "employee count or classification (small, medium, large)",
    "L&D_active": "yes or no",
    "services_provided": ["list of main services the company offers, e.g., software development, cloud, consulting, product-based"],
    "decision_makers": ["3 members list of names and roles"]
}}"#
    )
}

impl ResearchClient {
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PipelineError::Config("PERPLEXITY_API_KEY is not set".to_string()))?;
        Ok(Self {
            client: build_client(Some(Duration::from_secs(config.timeout_seconds)))?,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl ResearchPort for ResearchClient {
    #[instrument(skip(self, record))]
    async fn research(
        &self,
        record: &Record,
    ) -> std::result::Result<EnrichmentData, EnrichmentError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": research_prompt(record) }
            ],
            "temperature": 0.0,
            "max_output_tokens": self.max_output_tokens
        });

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(EnrichmentError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EnrichmentError::Status { status: status.as_u16(), body });
        }

        let completion: ChatCompletion = resp.json().await.map_err(EnrichmentError::Decode)?;
        let content = completion.first_content();
        debug!("Research content: {} chars", content.len());
        parse_research_content(&content)
    }
}
