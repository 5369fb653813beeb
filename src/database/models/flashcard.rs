//! Flashcard Record
//!
//! Persisted flashcards with provenance and the spaced-repetition fields.
//! Scheduling fields are opaque here; they are only given their initial
//! values on insert.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Provenance
// ============================================================================

/// Where a flashcard's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Produced by the model and accepted unedited
    MachineGenerated,
    /// Produced by the model, edited before acceptance
    MachineEdited,
    /// Written by the user outside the generation pipeline
    Manual,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::MachineGenerated => "machine-generated",
            Provenance::MachineEdited => "machine-edited",
            Provenance::Manual => "manual",
        }
    }

    /// Provenance for an accepted suggestion
    pub fn for_suggestion(was_edited: bool) -> Self {
        if was_edited {
            Provenance::MachineEdited
        } else {
            Provenance::MachineGenerated
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Provenance {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "machine-generated" => Ok(Provenance::MachineGenerated),
            "machine-edited" => Ok(Provenance::MachineEdited),
            "manual" => Ok(Provenance::Manual),
            _ => Err(format!("Unknown provenance: {}", s)),
        }
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Scheduling state of a freshly accepted card
pub const NEW_CARD_STATE: &str = "new";

// ============================================================================
// Flashcard Record
// ============================================================================

/// Flashcard database record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FlashcardRecord {
    pub id: String,
    pub deck_id: String,
    pub user_id: String,
    pub generation_id: Option<String>,
    pub front: String,
    pub back: String,
    /// Provenance as stored ("machine-generated", "machine-edited", "manual")
    pub source: String,
    pub due_at: String,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: i64,
    pub lapses: i64,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
}

impl FlashcardRecord {
    /// New card with default scheduling fields: due now, never reviewed.
    pub fn new(
        deck_id: impl Into<String>,
        user_id: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        let now = super::now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            deck_id: deck_id.into(),
            user_id: user_id.into(),
            generation_id: None,
            front: front.into(),
            back: back.into(),
            source: provenance.as_str().to_string(),
            due_at: now.clone(),
            stability: 0.0,
            difficulty: 0.0,
            reps: 0,
            lapses: 0,
            state: NEW_CARD_STATE.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_generation(mut self, generation_id: impl Into<String>) -> Self {
        self.generation_id = Some(generation_id.into());
        self
    }

    pub fn provenance(&self) -> Option<Provenance> {
        Provenance::try_from(self.source.as_str()).ok()
    }
}
