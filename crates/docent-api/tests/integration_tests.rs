//! Integration tests for the Docent API.
//!
//! Each test builds an independent in-memory corpus with the hash-based
//! embedding gateway and drives the router directly via tower's oneshot.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use docent_api::create_router;
use docent_api::handlers::{AskResponse, HealthResponse};
use docent_api::state::AppState;
use docent_core::config::DocentConfig;
use docent_vector::embedding::HashEmbedding;
use docent_vector::pipeline::BuildPipeline;
use docent_vector::search::{LoadedCorpus, QueryEngine};

const SAMPLE: &str = "\
1. What is X?
X is a thing.
2. What is Y?
Y is another thing.";

// =============================================================================
// Helpers
// =============================================================================

/// Create a fresh AppState serving a two-section corpus.
async fn make_state() -> AppState {
    let (index, corpus) = BuildPipeline::new(HashEmbedding::new())
        .build(SAMPLE)
        .await
        .unwrap();
    let engine = QueryEngine::new(
        Arc::new(LoadedCorpus::new(index, corpus)),
        HashEmbedding::new(),
    );
    AppState::new(DocentConfig::default(), Arc::new(engine))
}

async fn make_app() -> axum::Router {
    create_router(make_state().await)
}

/// Router for a service that has no corpus to serve.
fn make_app_without_corpus() -> axum::Router {
    create_router(AppState::without_corpus(DocentConfig::default()))
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// /ask
// =============================================================================

#[tokio::test]
async fn test_ask_returns_nearest_section() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json("/ask", r#"{"question":"1. What is X?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let parsed: AskResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.question, "1. What is X?");
    assert_eq!(parsed.context.title, "1. What is X?");
    assert_eq!(parsed.context.body, "X is a thing.");
    assert_eq!(parsed.distance, 0.0);
}

#[tokio::test]
async fn test_ask_response_shape() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json("/ask", r#"{"question":"anything at all"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert!(body["question"].is_string());
    assert!(body["context"]["title"].is_string());
    assert!(body["context"]["body"].is_string());
    assert!(body["distance"].is_number());
}

#[tokio::test]
async fn test_ask_empty_question_is_400() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json("/ask", r#"{"question":""}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_ask_whitespace_question_is_400() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json("/ask", r#"{"question":"   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_without_corpus_is_404() {
    let app = make_app_without_corpus();

    let resp = app
        .oneshot(post_json("/ask", r#"{"question":"What is X?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_ask_rejects_malformed_json() {
    let app = make_app().await;

    let resp = app
        .oneshot(post_json("/ask", "{not valid json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_requires_post() {
    let app = make_app().await;

    let resp = app
        .oneshot(Request::get("/ask").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// /health
// =============================================================================

#[tokio::test]
async fn test_health_reports_corpus() {
    let app = make_app().await;

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    let parsed: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.status, "ok");
    assert_eq!(parsed.corpus_sections, 2);
    assert_eq!(parsed.dimension, Some(384));
}

#[tokio::test]
async fn test_health_without_corpus_still_ok() {
    let app = make_app_without_corpus();

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["corpus_sections"], 0);
    assert!(body["dimension"].is_null());
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = make_app().await;

    let resp = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
