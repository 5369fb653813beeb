//! Collaborator Traits
//!
//! The pipeline's view of persistence. The SQLite `Database` implements all
//! three; tests substitute mocks to count calls.

use crate::database::{DeckRecord, FlashcardRecord, GenerationErrorRecord, GenerationRecord, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Deck ownership and recency lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeckDirectory: Send + Sync {
    async fn find_deck(&self, deck_id: &str) -> Result<Option<DeckRecord>, StoreError>;

    /// The user's most recently updated deck
    async fn most_recent_deck(&self, user_id: &str) -> Result<Option<DeckRecord>, StoreError>;
}

/// Generation audit and error log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationLog: Send + Sync {
    /// Successful generations (not error records) created at or after `since`
    async fn count_generations_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u32, StoreError>;

    async fn insert_generation(&self, record: &GenerationRecord) -> Result<(), StoreError>;

    async fn insert_generation_error(&self, record: &GenerationErrorRecord) -> Result<(), StoreError>;

    async fn find_generation(&self, generation_id: &str) -> Result<Option<GenerationRecord>, StoreError>;
}

/// Permanent flashcard storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlashcardStore: Send + Sync {
    /// Deck that earlier accepted cards of this generation went to
    async fn deck_for_generation(&self, generation_id: &str) -> Result<Option<String>, StoreError>;

    /// Insert the whole batch in one transaction
    async fn insert_flashcards(&self, cards: &[FlashcardRecord]) -> Result<(), StoreError>;
}
