use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Malformed artifact '{key}': {message}")]
    Artifact { key: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of a single research lookup. The enrichment stage never propagates
/// these; a record whose lookup failed simply stays unenriched.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("research request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("research API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("research API body is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("could not parse research content as JSON: {source}")]
    Parse {
        cleaned: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("research content is JSON but not an object")]
    NotAnObject { cleaned: String },
}

impl EnrichmentError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichmentError::Transport(e) if e.is_timeout() => "timeout",
            EnrichmentError::Transport(_) => "transport",
            EnrichmentError::Status { .. } => "status",
            EnrichmentError::Decode(_) => "decode",
            EnrichmentError::Parse { .. } => "parse",
            EnrichmentError::NotAnObject { .. } => "not_an_object",
        }
    }
}
