use crate::app::ports::ResearchPort;
use crate::constants::{
    FIELD_CIN, FIELD_SERVICES_PROVIDED, FIELD_SERVICE_CATEGORIES, FIELD_UPSTREAM_DECISION_MAKERS,
    OTHER_SERVICE_CATEGORY, SERVICE_CATEGORY_KEYWORDS,
};
use crate::error::EnrichmentError;
use crate::types::{EnrichmentData, Record};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Map free-text service descriptions onto coarse categories.
///
/// Each service is lowercased and checked against every keyword list, so one
/// service can land in several categories. A service that hits no list adds
/// "Other / Misc". The result is a set; iteration order is alphabetical.
pub fn categorize_services<S: AsRef<str>>(services: &[S]) -> BTreeSet<String> {
    let mut categories = BTreeSet::new();
    for service in services {
        let lowered = service.as_ref().to_lowercase();
        let mut matched = false;
        for (category, keywords) in SERVICE_CATEGORY_KEYWORDS {
            if keywords.iter().any(|k| lowered.contains(k)) {
                categories.insert(category.to_string());
                matched = true;
            }
        }
        if !matched {
            categories.insert(OTHER_SERVICE_CATEGORY.to_string());
        }
    }
    categories
}

/// `services_provided` as a list of strings; absent or malformed reads as empty.
pub fn services_provided(record: &Record) -> Vec<String> {
    record
        .get(FIELD_SERVICES_PROVIDED)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Fold an optional research result into a record.
///
/// Research keys overwrite record keys one by one. The upstream decision-makers
/// field is then restored byte-for-byte (an empty list when it was absent), and
/// `service_categories` is recomputed from the merged `services_provided`.
pub fn apply_enrichment(mut record: Record, enrichment: Option<EnrichmentData>) -> Record {
    let preserved = record
        .get(FIELD_UPSTREAM_DECISION_MAKERS)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    if let Some(data) = enrichment {
        for (key, value) in data.into_inner() {
            record.insert(key, value);
        }
    }

    let categories = categorize_services(&services_provided(&record));
    record.insert(
        FIELD_SERVICE_CATEGORIES.to_string(),
        Value::Array(categories.into_iter().map(Value::String).collect()),
    );
    record.insert(FIELD_UPSTREAM_DECISION_MAKERS.to_string(), preserved);
    record
}

/// Research a single record and merge whatever comes back. Lookup failures
/// are logged and leave the record unenriched; they never bubble up.
pub async fn enrich_record(research: &dyn ResearchPort, record: Record) -> Record {
    let enrichment = match research.research(&record).await {
        Ok(data) => {
            debug!("Research returned {} fields", data.0.len());
            Some(data)
        }
        Err(e) => {
            let cin = record.get(FIELD_CIN).and_then(Value::as_str).unwrap_or("");
            match &e {
                EnrichmentError::Parse { cleaned, .. }
                | EnrichmentError::NotAnObject { cleaned } => {
                    warn!(
                        cin = %cin,
                        kind = e.kind(),
                        raw = %cleaned,
                        "Failed to parse research response: {}",
                        e
                    );
                }
                _ => {
                    warn!(cin = %cin, kind = e.kind(), "Research lookup failed: {}", e);
                }
            }
            crate::metrics::enrichment_failed(e.kind());
            None
        }
    };
    apply_enrichment(record, enrichment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    struct FixedResearch(Value);

    #[async_trait]
    impl ResearchPort for FixedResearch {
        async fn research(&self, _record: &Record) -> Result<EnrichmentData, EnrichmentError> {
            Ok(EnrichmentData(self.0.as_object().cloned().unwrap()))
        }
    }

    struct UnparseableResearch;

    #[async_trait]
    impl ResearchPort for UnparseableResearch {
        async fn research(&self, _record: &Record) -> Result<EnrichmentData, EnrichmentError> {
            Err(EnrichmentError::NotAnObject { cleaned: "[]".to_string() })
        }
    }

    #[test]
    fn test_cloud_and_unmatched_service() {
        let categories = categorize_services(&["Cloud hosting", "Unrelated widget"]);
        let expected: BTreeSet<String> = ["Cloud Services", "Other / Misc"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(categories, expected);
    }

    #[test]
    fn test_one_service_can_hit_several_categories() {
        let categories = categorize_services(&["SaaS platform consulting"]);
        assert!(categories.contains("Software Development"));
        assert!(categories.contains("Product-Based"));
        assert!(categories.contains("Consulting / Service"));
        assert!(!categories.contains(OTHER_SERVICE_CATEGORY));
    }

    #[test]
    fn test_uppercase_keyword_never_matches_lowercased_text() {
        // "IT staffing" lowercases to "it staffing"; the "IT" keyword is compared verbatim
        let categories = categorize_services(&["IT staffing"]);
        assert_eq!(categories.into_iter().collect::<Vec<_>>(), vec!["Other / Misc"]);
    }

    #[test]
    fn test_no_services_means_no_categories() {
        let empty: [&str; 0] = [];
        assert!(categorize_services(&empty).is_empty());
    }

    #[test]
    fn test_apply_enrichment_restores_upstream_decision_makers() {
        let original = record(json!({
            "CIN": "U72200",
            "top_directors": ["R. Rao", "S. Iyer"]
        }));
        let data = EnrichmentData(
            json!({
                "size": "Large",
                "top_directors": ["clobbered"],
                "services_provided": ["App development"]
            })
            .as_object()
            .cloned()
            .unwrap(),
        );

        let enriched = apply_enrichment(original, Some(data));
        assert_eq!(enriched["top_directors"], json!(["R. Rao", "S. Iyer"]));
        assert_eq!(enriched["size"], json!("Large"));
        assert_eq!(enriched["service_categories"], json!(["Software Development"]));
    }

    #[test]
    fn test_apply_without_enrichment_sets_defaults() {
        let enriched = apply_enrichment(record(json!({ "CIN": "U72200" })), None);
        assert_eq!(enriched["service_categories"], json!([]));
        assert_eq!(enriched["top_directors"], json!([]));
        assert!(enriched.get("size").is_none());
    }

    #[tokio::test]
    async fn test_enrich_record_merges_research_fields() {
        let research = FixedResearch(json!({
            "size": "Medium",
            "L&D_active": "yes",
            "services_provided": ["Cloud migration", "Data consulting"],
            "decision_makers": ["A - CEO", "B - CTO", "C - COO"]
        }));
        let enriched = enrich_record(&research, record(json!({ "CIN": "L72200" }))).await;

        assert_eq!(enriched["L&D_active"], json!("yes"));
        assert_eq!(enriched["decision_makers"].as_array().unwrap().len(), 3);
        assert_eq!(
            enriched["service_categories"],
            json!(["Cloud Services", "Consulting / Service"])
        );
    }

    #[tokio::test]
    async fn test_enrich_record_swallows_failures() {
        let original = record(json!({
            "CIN": "U72900",
            "top_directors": [{"name": "P. Shah", "role": "Director"}]
        }));
        let enriched = enrich_record(&UnparseableResearch, original.clone()).await;

        assert_eq!(enriched["top_directors"], original["top_directors"]);
        assert_eq!(enriched["service_categories"], json!([]));
        assert!(enriched.get("L&D_active").is_none());
    }
}
