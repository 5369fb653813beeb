//! Generation Audit Records
//!
//! One row per generation attempt that passed validation and rate limiting:
//! either a `GenerationRecord` (success) or a `GenerationErrorRecord`
//! (failure), never both. The source text itself is never stored.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Longest error message kept in `generation_error_logs`
const MAX_ERROR_MESSAGE_CHARS: usize = 1000;

// ============================================================================
// Generation Record
// ============================================================================

/// Successful generation audit record. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GenerationRecord {
    pub id: String,
    pub user_id: String,
    pub model: String,
    /// SHA-256 hex fingerprint of the trimmed source text
    pub source_text_hash: String,
    /// Length of the trimmed source text in characters
    pub source_text_length: i64,
    pub generated_count: i64,
    pub generation_duration_ms: i64,
    pub created_at: String,
}

impl GenerationRecord {
    pub fn new(
        id: String,
        user_id: String,
        model: String,
        source_text_hash: String,
        source_text_length: usize,
        generated_count: usize,
        generation_duration_ms: u64,
    ) -> Self {
        Self {
            id,
            user_id,
            model,
            source_text_hash,
            source_text_length: source_text_length as i64,
            generated_count: generated_count as i64,
            generation_duration_ms: generation_duration_ms as i64,
            created_at: super::now_timestamp(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

// ============================================================================
// Generation Error Record
// ============================================================================

/// Failed generation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GenerationErrorRecord {
    pub id: String,
    pub user_id: String,
    pub model: String,
    pub error_code: String,
    pub error_message: String,
    pub created_at: String,
}

impl GenerationErrorRecord {
    pub fn new(
        user_id: impl Into<String>,
        model: impl Into<String>,
        error_code: impl Into<String>,
        error_message: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            model: model.into(),
            error_code: error_code.into(),
            error_message: error_message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect(),
            created_at: super::now_timestamp(),
        }
    }
}
