//! Acceptance Workflow
//!
//! Turns curated suggestions into permanent flashcards. Provenance follows
//! the caller's `was_edited` flag and the batch is written atomically.

use super::error::{FieldError, FlashcardError, Result};
use super::store::{DeckDirectory, FlashcardStore, GenerationLog};
use super::types::{AcceptanceInput, AcceptanceOutcome, AcceptedFlashcardInput};
use crate::database::{DeckRecord, FlashcardRecord, Provenance};
use std::sync::Arc;

pub const MAX_BATCH_SIZE: usize = 50;
pub const MAX_FRONT_CHARS: usize = 200;
pub const MAX_BACK_CHARS: usize = 500;

pub struct AcceptanceWorkflow {
    decks: Arc<dyn DeckDirectory>,
    log: Arc<dyn GenerationLog>,
    cards: Arc<dyn FlashcardStore>,
}

impl AcceptanceWorkflow {
    pub fn new(decks: Arc<dyn DeckDirectory>, log: Arc<dyn GenerationLog>, cards: Arc<dyn FlashcardStore>) -> Self {
        Self { decks, log, cards }
    }

    pub async fn accept(&self, user_id: &str, generation_id: &str, input: &AcceptanceInput) -> Result<AcceptanceOutcome> {
        validate_batch(&input.flashcards)?;

        let generation = self
            .log
            .find_generation(generation_id)
            .await?
            .ok_or_else(|| FlashcardError::GenerationNotFound(generation_id.to_string()))?;
        if !generation.is_owned_by(user_id) {
            return Err(FlashcardError::Forbidden(format!(
                "generation {} belongs to another user",
                generation_id
            )));
        }

        let deck = self
            .resolve_deck(user_id, generation_id, input.deck_id.as_deref())
            .await?;

        let records: Vec<FlashcardRecord> = input
            .flashcards
            .iter()
            .map(|item| {
                FlashcardRecord::new(
                    &deck.id,
                    user_id,
                    item.front.trim(),
                    item.back.trim(),
                    Provenance::for_suggestion(item.was_edited),
                )
                .with_generation(generation_id)
            })
            .collect();

        self.cards.insert_flashcards(&records).await?;

        let edited = records
            .iter()
            .filter(|r| r.provenance() == Some(Provenance::MachineEdited))
            .count();
        log::info!(
            "Accepted {} flashcard(s) ({} edited) from generation {} into deck {}",
            records.len(),
            edited,
            generation_id,
            deck.id
        );

        Ok(AcceptanceOutcome {
            created_count: records.len(),
            flashcards: records,
        })
    }

    /// Explicit deck, else the deck earlier cards of this generation went to,
    /// else the caller's most recently updated deck.
    async fn resolve_deck(&self, user_id: &str, generation_id: &str, explicit: Option<&str>) -> Result<DeckRecord> {
        if let Some(deck_id) = explicit {
            let deck = self
                .decks
                .find_deck(deck_id)
                .await?
                .ok_or_else(|| FlashcardError::DeckNotFound(deck_id.to_string()))?;
            if !deck.is_owned_by(user_id) {
                return Err(FlashcardError::Forbidden(format!("deck {} belongs to another user", deck_id)));
            }
            return Ok(deck);
        }

        if let Some(deck_id) = self.cards.deck_for_generation(generation_id).await? {
            match self.decks.find_deck(&deck_id).await? {
                Some(deck) if deck.is_owned_by(user_id) => return Ok(deck),
                _ => log::debug!("Inferred deck {} is unavailable, falling back", deck_id),
            }
        }

        self.decks.most_recent_deck(user_id).await?.ok_or_else(|| {
            FlashcardError::validation(vec![FieldError::new(
                "deck_id",
                "no target deck could be resolved, supply deck_id",
            )])
        })
    }
}

/// Batch size and per-field checks, all before any store call
fn validate_batch(items: &[AcceptedFlashcardInput]) -> Result<()> {
    if items.is_empty() || items.len() > MAX_BATCH_SIZE {
        return Err(FlashcardError::validation(vec![FieldError::new(
            "flashcards",
            format!("must contain between 1 and {} items, got {}", MAX_BATCH_SIZE, items.len()),
        )]));
    }

    let mut fields = Vec::new();
    for (i, item) in items.iter().enumerate() {
        check_side(&mut fields, i, "front", &item.front, MAX_FRONT_CHARS);
        check_side(&mut fields, i, "back", &item.back, MAX_BACK_CHARS);
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(FlashcardError::validation(fields))
    }
}

fn check_side(fields: &mut Vec<FieldError>, index: usize, side: &str, value: &str, max: usize) {
    let len = value.trim().chars().count();
    if len == 0 || len > max {
        fields.push(FieldError::new(
            format!("flashcards[{}].{}", index, side),
            format!("must be between 1 and {} characters", max),
        ));
    }
}
