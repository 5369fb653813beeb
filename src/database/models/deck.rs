//! Deck Record
//!
//! Decks are owned by the deck CRUD subsystem; this pipeline only reads
//! ownership and recency.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Deck database record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeckRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl DeckRecord {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = super::now_timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
