use crate::constants::{
    FIELD_CATEGORY, FIELD_CIN, FIELD_COMPANY_NAME, FIELD_INDUSTRIAL_CLASSIFICATION,
    FIELD_REGISTRATION_DATE, FIELD_ROC_CODE, FIELD_STATE_CODE, FIELD_STATUS, IT_CIN_PREFIXES,
    IT_NAME_KEYWORDS, TARGET_CATEGORY,
};
use crate::types::{NormalizedRecord, RawRecord};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Read a registry field as text. Numbers are rendered; anything else, or a
/// missing key, reads as "".
pub fn field_text(raw: &RawRecord, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Uppercased, trimmed identifier used as the dedup key.
pub fn normalized_cin(raw: &RawRecord) -> String {
    field_text(raw, FIELD_CIN).trim().to_uppercase()
}

/// Inclusion predicate for IT / business-services companies.
///
/// `(category == BUSINESS SERVICES && cin has an IT prefix) || name has an IT keyword`.
/// A keyword hit on the name is enough on its own, whatever the category.
pub fn is_it_company(raw: &RawRecord) -> bool {
    let cin = normalized_cin(raw);
    let name = field_text(raw, FIELD_COMPANY_NAME).trim().to_uppercase();
    let category = field_text(raw, FIELD_CATEGORY).trim().to_uppercase();

    let category_match = category == TARGET_CATEGORY
        && IT_CIN_PREFIXES.iter().any(|prefix| cin.starts_with(prefix));
    let keyword_match = IT_NAME_KEYWORDS.iter().any(|word| name.contains(word));

    category_match || keyword_match
}

/// Project a raw record onto the normalized field set. Every field is trimmed
/// independently and defaults to "" when absent; original casing is kept
/// except for the identifier.
pub fn normalize(raw: &RawRecord) -> NormalizedRecord {
    let trimmed = |key: &str| field_text(raw, key).trim().to_string();
    NormalizedRecord {
        cin: normalized_cin(raw),
        name: trimmed(FIELD_COMPANY_NAME),
        registration_authority_code: trimmed(FIELD_ROC_CODE),
        category: trimmed(FIELD_CATEGORY),
        registration_date: trimmed(FIELD_REGISTRATION_DATE),
        status: trimmed(FIELD_STATUS),
        region_code: trimmed(FIELD_STATE_CODE),
        industry_classification: trimmed(FIELD_INDUSTRIAL_CLASSIFICATION),
    }
}

/// Filter and deduplicate registry records.
///
/// Survivors are keyed by identifier in an insertion-ordered map. A later
/// record with the same identifier replaces the earlier one's fields but keeps
/// its position (last write wins). Records without an identifier all share the
/// "" key and collapse to one entry.
pub fn filter_records(records: &[Value]) -> Vec<NormalizedRecord> {
    let mut by_cin: IndexMap<String, NormalizedRecord> = IndexMap::new();

    for (i, value) in records.iter().enumerate() {
        let Some(raw) = value.as_object() else {
            debug!("Skipping non-object registry record at index {}", i);
            continue;
        };
        if !is_it_company(raw) {
            continue;
        }
        let normalized = normalize(raw);
        if by_cin.contains_key(&normalized.cin) {
            debug!("Duplicate CIN '{}' overwrites earlier record", normalized.cin);
        }
        by_cin.insert(normalized.cin.clone(), normalized);
    }

    by_cin.into_values().collect()
}
