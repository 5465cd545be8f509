//! Defensive parsing of free-text research answers.
//!
//! The remote model is asked for a bare JSON object but often wraps it in a
//! markdown fence or surrounds it with prose. Cleaning strips the fence and
//! keeps the greedy `{ ... }` span before handing it to `serde_json`.

use crate::error::EnrichmentError;
use crate::types::EnrichmentData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:json)?").expect("valid leading fence regex"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```$").expect("valid trailing fence regex"));
static OBJECT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object span regex"));

/// Strip code fences and isolate the outermost-looking JSON object.
/// Falls back to the whole trimmed text when there are no braces.
pub fn clean_json_response(content: &str) -> String {
    let mut text = content.to_string();
    if text.starts_with("```") {
        text = LEADING_FENCE.replace(text.trim(), "").into_owned();
        text = TRAILING_FENCE.replace(text.trim(), "").into_owned();
    }

    match OBJECT_SPAN.find(&text) {
        Some(m) => m.as_str().trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Parse model output into enrichment attributes.
pub fn parse_research_content(content: &str) -> Result<EnrichmentData, EnrichmentError> {
    let cleaned = clean_json_response(content);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Ok(EnrichmentData(map)),
        Ok(_) => Err(EnrichmentError::NotAnObject { cleaned }),
        Err(source) => Err(EnrichmentError::Parse { cleaned, source }),
    }
}
