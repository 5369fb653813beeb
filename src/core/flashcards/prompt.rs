//! Prompt and output contract for flashcard generation

use crate::core::llm::{ChatRequest, OutputSchema};
use serde_json::json;

/// Name of the structured-output schema sent to the provider
pub const FLASHCARD_SCHEMA_NAME: &str = "flashcards";

/// Strict schema: `{ "flashcards": [{ "front", "back" }] }`, nothing else
pub fn flashcard_schema() -> OutputSchema {
    OutputSchema::strict(
        FLASHCARD_SCHEMA_NAME,
        json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": { "type": "string" },
                            "back": { "type": "string" }
                        },
                        "required": ["front", "back"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["flashcards"],
            "additionalProperties": false
        }),
    )
}

pub fn system_prompt(count: usize) -> String {
    format!(
        "You are an expert educator who writes concise study flashcards.\n\
         Create exactly {count} flashcards from the text the user provides.\n\
         Each flashcard has a \"front\" with a single clear question or prompt \
         (at most 200 characters) and a \"back\" with a precise answer \
         (at most 500 characters).\n\
         Cover the most important facts and concepts, avoid duplicates, and do \
         not invent information that is not in the text.\n\
         Write every flashcard in the same language as the source text.\n\
         Respond only with JSON of the form {{\"flashcards\": [{{\"front\": \"...\", \"back\": \"...\"}}]}}."
    )
}

/// Completion request for `count` cards from `source_text`
pub fn generation_request(source_text: &str, model: &str, count: usize) -> ChatRequest {
    ChatRequest::new(source_text.trim())
        .with_model(model)
        .with_system(system_prompt(count))
        .with_response_format(flashcard_schema())
}
