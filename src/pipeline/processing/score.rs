use crate::constants::{
    BASELINE_SIZE_TIER, FIELD_LD_ACTIVE, FIELD_SCORE, FIELD_SERVICE_CATEGORIES, FIELD_SIZE,
    LD_WEIGHT, MAX_SIZE_TIER, SERVICE_WEIGHT, SIZE_TIERS, SIZE_WEIGHT,
};
use crate::error::{PipelineError, Result};
use crate::types::Record;
use serde_json::Value;
use std::collections::HashSet;

/// Target service categories a record is scored against. Never empty, and
/// never all blank.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCategories(Vec<String>);

impl TargetCategories {
    /// Parse a comma-separated list. Entries are trimmed; blank entries are
    /// kept and still count toward the service denominator. A list with no
    /// named category is rejected.
    pub fn parse(list: &str) -> Result<Self> {
        let targets: Vec<String> = list.split(',').map(|s| s.trim().to_string()).collect();
        if targets.iter().all(|s| s.is_empty()) {
            return Err(PipelineError::InvalidInput(
                "target categories must name at least one category".to_string(),
            ));
        }
        Ok(Self(targets))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Truthiness of a loosely typed flag: non-empty strings (including "no"),
/// `true`, non-zero numbers and non-empty collections all count.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Size tier as a fraction of the largest tier. Matching is exact and
/// case-sensitive; anything unrecognized scores as "Small".
pub fn size_score(value: Option<&Value>) -> f64 {
    let tier = value
        .and_then(Value::as_str)
        .and_then(|size| {
            SIZE_TIERS
                .iter()
                .find(|(label, _)| *label == size)
                .map(|(_, tier)| *tier)
        })
        .unwrap_or(BASELINE_SIZE_TIER);
    f64::from(tier) / f64::from(MAX_SIZE_TIER)
}

/// Share of targets covered by the record's service categories.
pub fn service_score(value: Option<&Value>, targets: &TargetCategories) -> f64 {
    let categories: HashSet<&str> = value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let overlap = targets
        .as_slice()
        .iter()
        .map(String::as_str)
        .collect::<HashSet<&str>>()
        .intersection(&categories)
        .count();
    overlap as f64 / targets.as_slice().len() as f64
}

/// Round to two decimals from the exact binary value, so 0.475 (stored just
/// below) becomes 0.47. Scaling by 100 first would round it up.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Weighted composite of L&D activity, size tier and service overlap,
/// rounded to two decimals.
pub fn score_record(record: &Record, targets: &TargetCategories) -> f64 {
    let ld = if is_truthy(record.get(FIELD_LD_ACTIVE)) { 1.0 } else { 0.0 };
    let size = size_score(record.get(FIELD_SIZE));
    let service = service_score(record.get(FIELD_SERVICE_CATEGORIES), targets);
    round2(ld * LD_WEIGHT + size * SIZE_WEIGHT + service * SERVICE_WEIGHT)
}

/// Attach a score to every record and order them best first. The sort is
/// stable, so equal scores keep their input order.
pub fn rank_records(records: Vec<Record>, targets: &TargetCategories) -> Vec<Record> {
    let mut scored: Vec<(f64, Record)> = records
        .into_iter()
        .map(|mut record| {
            let score = score_record(&record, targets);
            record.insert(FIELD_SCORE.to_string(), Value::from(score));
            (score, record)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, record)| record).collect()
}
