//! Pipeline DTOs

use crate::database::FlashcardRecord;
use serde::{Deserialize, Serialize};

/// An ephemeral front/back pair returned by generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub front: String,
    pub back: String,
}

impl Suggestion {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// Body of a generation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationInput {
    pub source_text: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Signed so out-of-range values surface as a field error
    #[serde(default)]
    pub count: Option<i64>,
}

impl GenerationInput {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub generation_id: String,
    pub suggestions: Vec<Suggestion>,
    pub model: String,
    pub generation_duration_ms: u64,
}

/// A suggestion the caller chose to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedFlashcardInput {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub was_edited: bool,
}

impl AcceptedFlashcardInput {
    pub fn new(front: impl Into<String>, back: impl Into<String>, was_edited: bool) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            was_edited,
        }
    }
}

/// Body of an acceptance request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptanceInput {
    #[serde(default)]
    pub deck_id: Option<String>,
    pub flashcards: Vec<AcceptedFlashcardInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptanceOutcome {
    pub created_count: usize,
    pub flashcards: Vec<FlashcardRecord>,
}
