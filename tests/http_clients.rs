use prospect_pipeline::app::ports::{RegistryPort, ResearchPort};
use prospect_pipeline::config::{RegistryConfig, ResearchConfig};
use prospect_pipeline::error::EnrichmentError;
use prospect_pipeline::infra::registry_client::RegistryClient;
use prospect_pipeline::infra::research_client::ResearchClient;
use prospect_pipeline::types::Record;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registry_config(server: &MockServer) -> RegistryConfig {
    RegistryConfig {
        base_url: format!("{}/resource/companies", server.uri()),
        api_key: Some("registry-key".to_string()),
        ..RegistryConfig::default()
    }
}

fn research_config(server: &MockServer, timeout_seconds: u64) -> ResearchConfig {
    ResearchConfig {
        api_url: format!("{}/chat/completions", server.uri()),
        api_key: Some("research-key".to_string()),
        timeout_seconds,
        ..ResearchConfig::default()
    }
}

fn company() -> Record {
    json!({ "CIN": "U72200TG2003PTC041835", "CompanyName": "Acme Software" })
        .as_object()
        .cloned()
        .unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn test_registry_sends_filter_and_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resource/companies"))
        .and(query_param("api-key", "registry-key"))
        .and(query_param("format", "json"))
        .and(query_param("filters[CompanyStateCode]", "TG"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"records":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::new(&registry_config(&server)).unwrap();
    let response = client.fetch_companies("TG").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"records":[]}"#);
}

#[tokio::test]
async fn test_registry_error_body_is_returned_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Key not authorised"))
        .mount(&server)
        .await;

    let client = RegistryClient::new(&registry_config(&server)).unwrap();
    let response = client.fetch_companies("TG").await.unwrap();
    assert_eq!(response.status, 403);
    assert_eq!(response.body, "Key not authorised");
}

#[tokio::test]
async fn test_research_request_shape_and_fenced_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer research-key"))
        .and(body_partial_json(json!({
            "model": "sonar-pro",
            "temperature": 0.0,
            "max_output_tokens": 200
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n{\"size\": \"Large\", \"L&D_active\": \"yes\", \"services_provided\": [\"Cloud\"], \"decision_makers\": [\"A\", \"B\", \"C\"]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ResearchClient::new(&research_config(&server, 30)).unwrap();
    let data = client.research(&company()).await.unwrap().into_inner();
    assert_eq!(data["size"], "Large");
    assert_eq!(data["decision_makers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_research_server_error_is_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = ResearchClient::new(&research_config(&server, 30)).unwrap();
    match client.research(&company()).await {
        Err(EnrichmentError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_research_prose_answer_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("I could not research this company.")),
        )
        .mount(&server)
        .await;

    let client = ResearchClient::new(&research_config(&server, 30)).unwrap();
    let err = client.research(&company()).await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn test_research_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ResearchClient::new(&research_config(&server, 1)).unwrap();
    let err = client.research(&company()).await.unwrap_err();
    assert_eq!(err.kind(), "timeout");
}
