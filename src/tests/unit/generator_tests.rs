//! Live Card Generator Tests

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::credentials::StaticCredential;
use crate::core::flashcards::generator::{CardGenerator, ModelCardGenerator, AI_RESPONSE_INCOMPLETE};
use crate::core::llm::{ClientConfig, ResilientModelClient, RetryPolicy};
use crate::tests::common::{completion_body, flashcards_json, lecture_notes, TEST_MODEL};
use crate::tests::mocks::RecordingSleeper;

async fn generator_replying(content: &str) -> (ModelCardGenerator, MockServer) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(&server)
        .await;

    let client = ResilientModelClient::new(
        ClientConfig::default().with_base_url(server.uri()),
        RetryPolicy::default().without_jitter(),
        Arc::new(StaticCredential::new("sk-or-v1-test-key-0123456789")),
    )
    .unwrap()
    .with_sleeper(Arc::new(RecordingSleeper::default()));

    (ModelCardGenerator::new(Arc::new(client)), server)
}

#[tokio::test]
async fn test_exact_count_is_returned() {
    let (generator, _server) = generator_replying(&flashcards_json(8)).await;

    let cards = generator.generate(&lecture_notes(1200), TEST_MODEL, 8).await.unwrap();

    assert_eq!(cards.len(), 8);
    assert_eq!(cards[0].front, "Question 1?");
    assert_eq!(cards[7].back, "Answer 8.");
}

#[tokio::test]
async fn test_extra_cards_are_truncated() {
    let (generator, _server) = generator_replying(&flashcards_json(12)).await;

    let cards = generator.generate(&lecture_notes(1200), TEST_MODEL, 10).await.unwrap();

    assert_eq!(cards.len(), 10);
}

#[tokio::test]
async fn test_short_reply_is_incomplete() {
    let (generator, _server) = generator_replying(&flashcards_json(3)).await;

    let err = generator.generate(&lecture_notes(1200), TEST_MODEL, 5).await.unwrap_err();

    assert_eq!(err.code, AI_RESPONSE_INCOMPLETE);
}

#[tokio::test]
async fn test_blank_card_is_incomplete() {
    let reply = json!({ "flashcards": [
        { "front": "Q1", "back": "A1" },
        { "front": "   ", "back": "A2" },
        { "front": "Q3", "back": "A3" },
        { "front": "Q4", "back": "A4" },
        { "front": "Q5", "back": "A5" }
    ]})
    .to_string();
    let (generator, _server) = generator_replying(&reply).await;

    let err = generator.generate(&lecture_notes(1200), TEST_MODEL, 5).await.unwrap_err();

    assert_eq!(err.code, AI_RESPONSE_INCOMPLETE);
}

#[tokio::test]
async fn test_sends_system_prompt_and_trimmed_text() {
    let (generator, server) = generator_replying(&flashcards_json(5)).await;
    let text = format!("  {}  ", lecture_notes(1200));

    generator.generate(&text, TEST_MODEL, 5).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("exactly 5 flashcards"));
    assert_eq!(body["messages"][1]["content"], text.trim());
    assert_eq!(body["model"], TEST_MODEL);
}
