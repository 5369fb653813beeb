//! Test Fixtures
//!
//! Temp databases, decks, source text and canned provider replies.

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::database::{Database, DeckOps, DeckRecord};

pub const TEST_USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";
pub const TEST_MODEL: &str = "openai/gpt-4o-mini";

// =============================================================================
// Database Fixtures
// =============================================================================

/// Create a test database in a temporary directory.
/// Returns both the database and the TempDir (which must be kept alive).
pub async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db = Database::new(temp_dir.path())
        .await
        .expect("Failed to create test database");
    (db, temp_dir)
}

/// Insert a deck owned by `user_id`
pub async fn create_test_deck(db: &Database, user_id: &str, name: &str) -> DeckRecord {
    let deck = DeckRecord::new(user_id, name);
    db.create_deck(&deck).await.expect("Failed to create deck");
    deck
}

/// A deck record that is not stored anywhere
pub fn deck_for(user_id: &str) -> DeckRecord {
    DeckRecord::new(user_id, "Biology")
}

// =============================================================================
// Source Text
// =============================================================================

/// Source text of exactly `len` characters
pub fn source_text(len: usize) -> String {
    "a".repeat(len)
}

/// Readable multi-sentence source text of at least `min_len` characters
pub fn lecture_notes(min_len: usize) -> String {
    let sentence = "Mitochondria produce most of the chemical energy needed to power the cell. ";
    sentence.repeat(min_len / sentence.len() + 1)
}

// =============================================================================
// Provider Replies
// =============================================================================

/// JSON text with `n` flashcards, as the model would write it
pub fn flashcards_json(n: usize) -> String {
    let cards: Vec<Value> = (0..n)
        .map(|i| json!({ "front": format!("Question {}?", i + 1), "back": format!("Answer {}.", i + 1) }))
        .collect();
    json!({ "flashcards": cards }).to_string()
}

/// OpenAI-style chat completion body whose assistant message is `content`
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "gen-123",
        "object": "chat.completion",
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200 }
    })
}
