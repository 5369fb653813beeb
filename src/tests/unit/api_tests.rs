//! HTTP API Tests
//!
//! Full router over a temp SQLite database and the offline generator.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::api::{self, AppState, USER_ID_HEADER};
use crate::core::flashcards::{AcceptanceWorkflow, GenerationOrchestrator, OfflineCardGenerator, RateLimiter};
use crate::database::{Database, FlashcardOps, GenerationOps, GenerationRecord};
use crate::tests::common::{create_test_db, create_test_deck, source_text, OTHER_USER, TEST_MODEL, TEST_USER};
use crate::tests::mocks::RecordingSleeper;

async fn test_app() -> (Router, Database, TempDir) {
    let (db, dir) = create_test_db().await;
    let shared = Arc::new(db.clone());

    let generator = OfflineCardGenerator::default().with_sleeper(Arc::new(RecordingSleeper::default()));
    let orchestrator = GenerationOrchestrator::new(
        shared.clone(),
        shared.clone(),
        RateLimiter::new(shared.clone(), 10),
        Arc::new(generator),
    );
    let acceptance = AcceptanceWorkflow::new(shared.clone(), shared.clone(), shared);

    let state = Arc::new(AppState {
        orchestrator,
        acceptance,
        client: None,
    });
    (api::router(state), db, dir)
}

fn post_json(uri: &str, user: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn generation_uri(deck_id: &str) -> String {
    format!("/api/decks/{}/generations", deck_id)
}

#[tokio::test]
async fn test_health() {
    let (app, _db, _dir) = test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_generate_then_accept_end_to_end() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    let body = json!({ "source_text": source_text(1000) }).to_string();
    let (status, generated) = send(&app, post_json(&generation_uri(&deck.id), Some(TEST_USER), body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["suggestions"].as_array().unwrap().len(), 10);
    assert_eq!(generated["model"], TEST_MODEL);
    assert!(generated["generation_duration_ms"].as_u64().is_some());

    let generation_id = generated["generation_id"].as_str().unwrap().to_string();
    let record = db.get_generation(&generation_id).await.unwrap().unwrap();
    assert_eq!(record.generated_count, 10);
    assert_eq!(record.source_text_length, 1000);

    let picks: Vec<Value> = generated["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, s)| json!({ "front": s["front"], "back": s["back"], "was_edited": i == 0 }))
        .collect();
    let uri = format!("/api/generations/{}/accept", generation_id);
    let (status, accepted) = send(
        &app,
        post_json(&uri, Some(TEST_USER), json!({ "flashcards": picks }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(accepted["created_count"], 3);
    assert_eq!(accepted["flashcards"][0]["source"], "machine-edited");
    assert_eq!(accepted["flashcards"][1]["source"], "machine-generated");
    assert_eq!(accepted["flashcards"][0]["deck_id"], deck.id.as_str());

    let stored = db.list_flashcards_for_generation(&generation_id).await.unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    let body = json!({ "source_text": source_text(1000) }).to_string();
    let (status, error) = send(&app, post_json(&generation_uri(&deck.id), None, body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    let (status, error) = send(
        &app,
        post_json(&generation_uri(&deck.id), Some(TEST_USER), "{\"source_text\": ".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_short_text_reports_field() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    let body = json!({ "source_text": "too short", "count": 5 }).to_string();
    let (status, error) = send(&app, post_json(&generation_uri(&deck.id), Some(TEST_USER), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["details"]["fields"][0]["field"], "source_text");
}

#[tokio::test]
async fn test_unknown_and_foreign_decks() {
    let (app, db, _dir) = test_app().await;
    let theirs = create_test_deck(&db, OTHER_USER, "Theirs").await;
    let body = json!({ "source_text": source_text(1000) }).to_string();

    let (status, error) = send(&app, post_json(&generation_uri("nope"), Some(TEST_USER), body.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["code"], "DECK_NOT_FOUND");

    let (status, error) = send(&app, post_json(&generation_uri(&theirs.id), Some(TEST_USER), body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_hourly_ceiling_is_enforced() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    for i in 0..10 {
        let record = GenerationRecord::new(
            format!("gen-{}", i),
            TEST_USER.to_string(),
            TEST_MODEL.to_string(),
            "0".repeat(64),
            1000,
            10,
            5,
        );
        db.record_generation(&record).await.unwrap();
    }

    let body = json!({ "source_text": source_text(1000) }).to_string();
    let (status, error) = send(&app, post_json(&generation_uri(&deck.id), Some(TEST_USER), body.clone())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error["error"]["code"], "RATE_LIMIT_EXCEEDED");

    // Another user is unaffected
    let other_deck = create_test_deck(&db, OTHER_USER, "Chemistry").await;
    let (status, _) = send(&app, post_json(&generation_uri(&other_deck.id), Some(OTHER_USER), body)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_accepting_someone_elses_generation() {
    let (app, db, _dir) = test_app().await;
    let deck = create_test_deck(&db, TEST_USER, "Biology").await;

    let body = json!({ "source_text": source_text(1000), "count": 5 }).to_string();
    let (_, generated) = send(&app, post_json(&generation_uri(&deck.id), Some(TEST_USER), body)).await;
    let uri = format!("/api/generations/{}/accept", generated["generation_id"].as_str().unwrap());

    let picks = json!({ "flashcards": [{ "front": "Q", "back": "A", "was_edited": false }] }).to_string();
    let (status, error) = send(&app, post_json(&uri, Some(OTHER_USER), picks.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"]["code"], "FORBIDDEN");

    let (status, error) = send(&app, post_json("/api/generations/missing/accept", Some(TEST_USER), picks)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"]["code"], "GENERATION_NOT_FOUND");
}

#[tokio::test]
async fn test_usage_without_live_client() {
    let (app, _db, _dir) = test_app().await;
    let request = Request::builder().uri("/api/llm/usage").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["live_enabled"], false);
    assert_eq!(body["usage"]["total_requests"], 0);
    assert!(body["last_response"].is_null());
}
