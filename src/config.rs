use crate::constants;
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "pipeline.toml";

/// Process-wide configuration. Built once at start-up and handed to each
/// component by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Local directory where artifacts are staged before upload
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_research_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_research_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Fs,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub service_role_key: Option<String>,
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_registry_url() -> String {
    constants::REGISTRY_BASE_URL.to_string()
}
fn default_page_size() -> u32 {
    constants::REGISTRY_PAGE_SIZE
}
fn default_research_url() -> String {
    constants::RESEARCH_API_URL.to_string()
}
fn default_model() -> String {
    constants::RESEARCH_MODEL.to_string()
}
fn default_research_timeout() -> u64 {
    constants::RESEARCH_TIMEOUT_SECS
}
fn default_max_output_tokens() -> u32 {
    constants::RESEARCH_MAX_OUTPUT_TOKENS
}
fn default_storage_root() -> PathBuf {
    PathBuf::from("data/blobs")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            page_size: default_page_size(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

impl RegistryConfig {
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| PipelineError::Config("COMPANIES_API_KEY is not set".to_string()))
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_research_url(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_research_timeout(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            supabase_url: None,
            bucket: None,
            prefix: None,
            service_role_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            research: ResearchConfig::default(),
            storage: StorageConfig::default(),
            staging_dir: default_staging_dir(),
        }
    }
}

impl Config {
    /// Load `.env`, then the optional TOML file (`PIPELINE_CONFIG` or
    /// `pipeline.toml`), then apply environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path =
            std::env::var("PIPELINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file_if_present(Path::new(&config_path))?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn from_file_if_present(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Secrets and deployment-specific values come from the environment and
    /// take precedence over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("COMPANIES_API_KEY") {
            self.registry.api_key = Some(key);
        }
        if let Some(key) = non_empty("PERPLEXITY_API_KEY") {
            self.research.api_key = Some(key);
        }
        if let Some(dir) = non_empty("PIPELINE_STAGING_DIR") {
            self.staging_dir = PathBuf::from(dir);
        }
        if let Some(root) = non_empty("PIPELINE_STORAGE_ROOT") {
            self.storage.root = PathBuf::from(root);
        }

        // Supabase accepts either a full URL or a project ref
        if let Some(url) = non_empty("SUPABASE_URL") {
            self.storage.supabase_url = Some(url);
        } else if let Some(project_ref) = non_empty("SUPABASE_PROJECT_REF") {
            self.storage.supabase_url = Some(format!("https://{}.supabase.co", project_ref));
        }
        if let Some(bucket) = non_empty("SUPABASE_BUCKET") {
            self.storage.bucket = Some(bucket);
        }
        if let Some(prefix) = non_empty("SUPABASE_PREFIX") {
            self.storage.prefix = Some(prefix);
        }
        if let Some(key) = non_empty("SUPABASE_SERVICE_ROLE_KEY") {
            self.storage.service_role_key = Some(key);
        }
        if self.storage.supabase_url.is_some() && self.storage.bucket.is_some() {
            self.storage.backend = StorageBackend::Supabase;
        }
    }
}
