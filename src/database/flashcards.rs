//! Flashcard database operations

use super::models::FlashcardRecord;
use super::Database;

/// Extension trait for flashcard database operations
pub trait FlashcardOps {
    fn insert_flashcard_batch(&self, cards: &[FlashcardRecord]) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn deck_of_generation(&self, generation_id: &str) -> impl std::future::Future<Output = Result<Option<String>, sqlx::Error>> + Send;
    fn list_flashcards_for_generation(&self, generation_id: &str) -> impl std::future::Future<Output = Result<Vec<FlashcardRecord>, sqlx::Error>> + Send;
}

impl FlashcardOps for Database {
    /// Insert every card or none of them
    async fn insert_flashcard_batch(&self, cards: &[FlashcardRecord]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        for card in cards {
            sqlx::query(
                r#"
                INSERT INTO flashcards
                (id, deck_id, user_id, generation_id, front, back, source, due_at,
                 stability, difficulty, reps, lapses, state, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&card.id)
            .bind(&card.deck_id)
            .bind(&card.user_id)
            .bind(&card.generation_id)
            .bind(&card.front)
            .bind(&card.back)
            .bind(&card.source)
            .bind(&card.due_at)
            .bind(card.stability)
            .bind(card.difficulty)
            .bind(card.reps)
            .bind(card.lapses)
            .bind(&card.state)
            .bind(&card.created_at)
            .bind(&card.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Deck of the most recent card already accepted from this generation
    async fn deck_of_generation(&self, generation_id: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT deck_id FROM flashcards WHERE generation_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(generation_id)
        .fetch_optional(self.pool())
        .await
    }

    async fn list_flashcards_for_generation(&self, generation_id: &str) -> Result<Vec<FlashcardRecord>, sqlx::Error> {
        sqlx::query_as::<_, FlashcardRecord>(
            "SELECT * FROM flashcards WHERE generation_id = ? ORDER BY created_at, id",
        )
        .bind(generation_id)
        .fetch_all(self.pool())
        .await
    }
}
