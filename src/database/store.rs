//! Collaborator trait implementations backed by SQLite

use super::{Database, DeckOps, FlashcardOps, GenerationOps, StoreError};
use super::models::{format_timestamp, DeckRecord, FlashcardRecord, GenerationErrorRecord, GenerationRecord};
use crate::core::flashcards::store::{DeckDirectory, FlashcardStore, GenerationLog};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl DeckDirectory for Database {
    async fn find_deck(&self, deck_id: &str) -> Result<Option<DeckRecord>, StoreError> {
        self.get_deck(deck_id).await.map_err(StoreError::from_sqlx)
    }

    async fn most_recent_deck(&self, user_id: &str) -> Result<Option<DeckRecord>, StoreError> {
        self.latest_deck_for_user(user_id)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl GenerationLog for Database {
    async fn count_generations_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u32, StoreError> {
        self.count_user_generations_since(user_id, &format_timestamp(since))
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_generation(&self, record: &GenerationRecord) -> Result<(), StoreError> {
        self.record_generation(record)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_generation_error(&self, record: &GenerationErrorRecord) -> Result<(), StoreError> {
        self.record_generation_error(record)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_generation(&self, generation_id: &str) -> Result<Option<GenerationRecord>, StoreError> {
        self.get_generation(generation_id)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl FlashcardStore for Database {
    async fn deck_for_generation(&self, generation_id: &str) -> Result<Option<String>, StoreError> {
        self.deck_of_generation(generation_id)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_flashcards(&self, cards: &[FlashcardRecord]) -> Result<(), StoreError> {
        self.insert_flashcard_batch(cards)
            .await
            .map_err(StoreError::from_sqlx)
    }
}
