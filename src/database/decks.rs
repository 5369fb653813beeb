//! Deck database operations
//!
//! Decks are managed elsewhere; the pipeline needs ownership lookups and the
//! caller's most recently updated deck.

use super::models::DeckRecord;
use super::Database;

/// Extension trait for deck database operations
pub trait DeckOps {
    fn create_deck(&self, deck: &DeckRecord) -> impl std::future::Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_deck(&self, id: &str) -> impl std::future::Future<Output = Result<Option<DeckRecord>, sqlx::Error>> + Send;
    fn latest_deck_for_user(&self, user_id: &str) -> impl std::future::Future<Output = Result<Option<DeckRecord>, sqlx::Error>> + Send;
}

impl DeckOps for Database {
    async fn create_deck(&self, deck: &DeckRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO decks (id, user_id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&deck.id)
        .bind(&deck.user_id)
        .bind(&deck.name)
        .bind(&deck.created_at)
        .bind(&deck.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_deck(&self, id: &str) -> Result<Option<DeckRecord>, sqlx::Error> {
        sqlx::query_as::<_, DeckRecord>("SELECT * FROM decks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    async fn latest_deck_for_user(&self, user_id: &str) -> Result<Option<DeckRecord>, sqlx::Error> {
        sqlx::query_as::<_, DeckRecord>(
            "SELECT * FROM decks WHERE user_id = ? ORDER BY updated_at DESC, id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
    }
}
