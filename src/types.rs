use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A company record exactly as returned by the registry; no schema enforced.
pub type RawRecord = Map<String, Value>;

/// A record flowing through enrichment and scoring. Stages add fields to it
/// but never remove upstream ones.
pub type Record = Map<String, Value>;

/// Fixed-shape projection of a registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "CIN")]
    pub cin: String,
    #[serde(rename = "CompanyName")]
    pub name: String,
    #[serde(rename = "CompanyROCcode")]
    pub registration_authority_code: String,
    #[serde(rename = "CompanyCategory")]
    pub category: String,
    #[serde(rename = "CompanyRegistrationdate_date")]
    pub registration_date: String,
    #[serde(rename = "CompanyStatus")]
    pub status: String,
    #[serde(rename = "CompanyStateCode")]
    pub region_code: String,
    #[serde(rename = "CompanyIndustrialClassification")]
    pub industry_classification: String,
}

/// Attributes returned by the research API. Only `Map` semantics matter to the
/// pipeline: every key is merged into the record as-is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnrichmentData(pub Map<String, Value>);

impl EnrichmentData {
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Response envelope returned by each stage (CLI output and HTTP body).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageReport {
    pub message: String,
    pub s3_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_5_companies: Option<Vec<Record>>,
}

/// Outcome of an acquisition run. A registry rejection is reported to the
/// caller, not raised.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquireOutcome {
    Stored(StageReport),
    Rejected { error: String },
}

impl AcquireOutcome {
    pub fn to_json(&self) -> Value {
        match self {
            AcquireOutcome::Stored(report) => {
                serde_json::to_value(report).unwrap_or(Value::Null)
            }
            AcquireOutcome::Rejected { error } => serde_json::json!({ "error": error }),
        }
    }
}

/// Raw registry reply: status plus untouched body text.
#[derive(Debug, Clone)]
pub struct RegistryResponse {
    pub status: u16,
    pub body: String,
}
