use anyhow::Result;
use async_trait::async_trait;
use prospect_pipeline::app::acquire_use_case::AcquireUseCase;
use prospect_pipeline::app::enrich_use_case::EnrichUseCase;
use prospect_pipeline::app::filter_use_case::FilterUseCase;
use prospect_pipeline::app::ports::{RegistryPort, ResearchPort};
use prospect_pipeline::app::score_use_case::ScoreUseCase;
use prospect_pipeline::error::{EnrichmentError, PipelineError};
use prospect_pipeline::pipeline::processing::research_response::parse_research_content;
use prospect_pipeline::pipeline::storage::InMemoryBlobStore;
use prospect_pipeline::types::{AcquireOutcome, EnrichmentData, Record, RegistryResponse};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

struct FakeRegistry {
    status: u16,
    body: String,
}

#[async_trait]
impl RegistryPort for FakeRegistry {
    async fn fetch_companies(
        &self,
        _region_code: &str,
    ) -> prospect_pipeline::error::Result<RegistryResponse> {
        Ok(RegistryResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Answers with canned model output keyed by CIN and counts calls.
struct ScriptedResearch {
    calls: AtomicUsize,
}

#[async_trait]
impl ResearchPort for ScriptedResearch {
    async fn research(&self, record: &Record) -> Result<EnrichmentData, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let cin = record.get("CIN").and_then(Value::as_str).unwrap_or("");
        let content = match cin {
            "U72200TG2001PTC000001" => "```json\n{\"size\": \"Large\", \"L&D_active\": \"yes\", \"services_provided\": [\"Cloud hosting\", \"Unrelated widget\"], \"decision_makers\": [\"A - CEO\", \"B - CTO\", \"C - CFO\"]}\n```",
            "U72900TG2010PTC000003" => "Sorry, no data available for this company.",
            _ => "{\"size\": \"Medium\", \"L&D_active\": \"\", \"services_provided\": [\"Custom software development\"], \"decision_makers\": []}",
        };
        parse_research_content(content)
    }
}

fn registry_body() -> String {
    json!({
        "title": "Company Master Data",
        "total": 7,
        "records": [
            { "CIN": "U72200TG2001PTC000001", "CompanyName": "Acme Cloud Private Limited", "CompanyCategory": "Business Services", "CompanyStateCode": "TG", "top_directors": ["R. Rao"] },
            { "CIN": "U01100TG2005PTC000002", "CompanyName": "Green Farms Limited", "CompanyCategory": "Agriculture", "CompanyStateCode": "TG" },
            { "CIN": "U72900TG2010PTC000003", "CompanyName": "Nimbus Systems", "CompanyCategory": "Company limited by Shares", "CompanyStateCode": "TG" },
            { "CIN": "U62099TG2015PTC000004", "CompanyName": "Hyd Analytics", "CompanyCategory": "Business Services", "CompanyStateCode": "TG" },
            { "CIN": "U72400TG2016PTC000005", "CompanyName": "Deccan Software", "CompanyCategory": "Business Services", "CompanyStateCode": "TG" },
            { "CIN": "L72200TG2017PLC000006", "CompanyName": "Charminar Technology", "CompanyCategory": "Business Services", "CompanyStateCode": "TG" },
            { "CIN": "U72300TG2018PTC000007", "CompanyName": "Golconda Platform", "CompanyCategory": "Business Services", "CompanyStateCode": "TG" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_full_pipeline_over_blob_store() -> Result<()> {
    let staging = tempdir()?;
    let store = Arc::new(InMemoryBlobStore::new());
    let registry = Arc::new(FakeRegistry { status: 200, body: registry_body() });
    let research = Arc::new(ScriptedResearch { calls: AtomicUsize::new(0) });

    // Acquisition stores the body verbatim
    let outcome = AcquireUseCase::new(registry, store.clone(), staging.path().to_path_buf())
        .run("TG")
        .await?;
    let raw_key = match outcome {
        AcquireOutcome::Stored(report) => report.s3_file,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert!(raw_key.starts_with("unprocessedList/companies_tg_"));
    assert_eq!(String::from_utf8(store.object(&raw_key).unwrap())?, registry_body());

    // Filter keeps the six IT companies
    let filtered = FilterUseCase::new(store.clone(), staging.path().to_path_buf())
        .run(&raw_key)
        .await?;
    assert_eq!(filtered.records_count, Some(6));
    assert!(filtered.s3_file.starts_with("processed/clean_it_companies_"));
    assert!(staging.path().join("processedList").is_dir());

    // Enrichment is capped at five records
    let enriched = EnrichUseCase::new(research.clone(), store.clone(), staging.path().to_path_buf())
        .run(&filtered.s3_file)
        .await?;
    assert_eq!(enriched.records_count, Some(5));
    assert_eq!(research.calls.load(Ordering::SeqCst), 5);

    let enriched_records: Vec<Value> = serde_json::from_str(&String::from_utf8(
        store.object(&enriched.s3_file).unwrap(),
    )?)?;
    assert_eq!(enriched_records.len(), 5);
    let acme = &enriched_records[0];
    assert_eq!(acme["size"], "Large");
    let mut categories: Vec<&str> = acme["service_categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    categories.sort();
    assert_eq!(categories, vec!["Cloud Services", "Other / Misc"]);
    // Normalization drops unknown registry fields, so directors read as empty
    assert_eq!(acme["top_directors"], json!([]));

    // The unparseable answer leaves Nimbus unenriched but still present
    let nimbus = &enriched_records[1];
    assert_eq!(nimbus["CIN"], "U72900TG2010PTC000003");
    assert!(nimbus.get("size").is_none());
    assert_eq!(nimbus["service_categories"], json!([]));

    // Scoring ranks Acme first with a perfect L&D + size score
    let scored = ScoreUseCase::new(store.clone(), staging.path().to_path_buf())
        .run(&enriched.s3_file, Some("Cloud Services"))
        .await?;
    assert_eq!(scored.records_count, Some(5));
    let top = scored.top_5_companies.unwrap();
    assert_eq!(top[0]["CIN"], "U72200TG2001PTC000001");
    assert_eq!(top[0]["score"], json!(1.0));
    // Empty "L&D_active" is falsy: Medium only = 0.35 * 2/3
    assert_eq!(top[1]["score"], json!(0.23));
    assert_eq!(top[4]["CIN"], "U72900TG2010PTC000003");
    assert_eq!(top[4]["score"], json!(0.12));

    let scores: Vec<f64> = top.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    Ok(())
}

#[tokio::test]
async fn test_registry_rejection_is_reported_not_stored() -> Result<()> {
    let staging = tempdir()?;
    let store = Arc::new(InMemoryBlobStore::new());
    let registry = Arc::new(FakeRegistry {
        status: 403,
        body: "{\"error\":\"Key not authorised\"}".to_string(),
    });

    let outcome = AcquireUseCase::new(registry, store.clone(), staging.path().to_path_buf())
        .run("TG")
        .await?;

    assert_eq!(
        outcome.to_json(),
        json!({ "error": "{\"error\":\"Key not authorised\"}" })
    );
    assert!(store.keys().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_filter_without_records_key_writes_empty_list() -> Result<()> {
    let staging = tempdir()?;
    let store = Arc::new(InMemoryBlobStore::new());
    store.insert("unprocessedList/empty.json", "{\"message\": \"no data\"}");

    let report = FilterUseCase::new(store.clone(), staging.path().to_path_buf())
        .run("unprocessedList/empty.json")
        .await?;

    assert_eq!(report.records_count, Some(0));
    let written: Value =
        serde_json::from_slice(&store.object(&report.s3_file).unwrap())?;
    assert_eq!(written, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_enrichment_preserves_upstream_directors_on_failure() -> Result<()> {
    struct AlwaysDown;

    #[async_trait]
    impl ResearchPort for AlwaysDown {
        async fn research(&self, _record: &Record) -> Result<EnrichmentData, EnrichmentError> {
            Err(EnrichmentError::Status { status: 503, body: "unavailable".to_string() })
        }
    }

    let staging = tempdir()?;
    let store = Arc::new(InMemoryBlobStore::new());
    let directors = json!([{ "name": "P. Shah", "role": "Managing Director" }, "K. Menon"]);
    store.insert(
        "processed/clean.json",
        json!([
            { "CIN": "U72200X", "CompanyName": "X Software", "top_directors": directors.clone() },
            { "CIN": "U72200Y", "CompanyName": "Y Software" }
        ])
        .to_string(),
    );

    let report = EnrichUseCase::new(
        Arc::new(AlwaysDown),
        store.clone(),
        staging.path().to_path_buf(),
    )
    .run("processed/clean.json")
    .await?;

    let written: Vec<Value> = serde_json::from_slice(&store.object(&report.s3_file).unwrap())?;
    assert_eq!(written.len(), 2);
    assert_eq!(written[0]["top_directors"], directors);
    assert_eq!(written[1]["top_directors"], json!([]));
    assert!(written.iter().all(|r| r.get("L&D_active").is_none()));
    Ok(())
}

#[tokio::test]
async fn test_scoring_missing_artifact_is_storage_error() {
    let staging = tempdir().unwrap();
    let store = Arc::new(InMemoryBlobStore::new());
    let err = ScoreUseCase::new(store.clone(), staging.path().to_path_buf())
        .run("enrichedList/missing.json", None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Storage { .. }));
    assert!(store.keys().is_empty());
}
