use crate::error::PipelineError;
use crate::pipeline::stages::Stages;
use axum::{
    extract::{Path, Query},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "prospect-pipeline",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_response(e: PipelineError) -> Response {
    let status = match e {
        PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

/// Wildcard captures are storage keys; tolerate a leading slash either way.
fn storage_key(path: &str) -> &str {
    path.trim_start_matches('/')
}

async fn get_companies(
    Extension(stages): Extension<Stages>,
    Path(state): Path<String>,
) -> Response {
    match stages.acquire(&state).await {
        Ok(outcome) => Json(outcome.to_json()).into_response(),
        Err(e) => error_response(e),
    }
}

async fn process_raw(Extension(stages): Extension<Stages>, Path(path): Path<String>) -> Response {
    match stages.filter(storage_key(&path)).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

async fn enrich_clean(Extension(stages): Extension<Stages>, Path(path): Path<String>) -> Response {
    match stages.enrich(storage_key(&path)).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ScoreParams {
    target_categories: Option<String>,
}

async fn score_enriched(
    Extension(stages): Extension<Stages>,
    Path(path): Path<String>,
    Query(params): Query<ScoreParams>,
) -> Response {
    match stages
        .score(storage_key(&path), params.target_categories.as_deref())
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

/// Create the HTTP router exposing one route per stage
pub fn create_server(stages: Stages) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/companies/:state", get(get_companies))
        .route("/processing/*path", get(process_raw))
        .route("/enriching/*path", get(enrich_clean))
        .route("/score/*path", get(score_enriched))
        .layer(Extension(stages))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(stages: Stages, port: u16) -> anyhow::Result<()> {
    let app = create_server(stages);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{}", port);
    info!("Health check: http://localhost:{}/health", port);

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
