//! Flashcard Pipeline Errors
//!
//! Every failure of the generation and acceptance workflows resolves to one
//! machine-readable code and an HTTP status.

use crate::core::llm::ServiceError;
use crate::database::StoreError;
use serde::Serialize;
use thiserror::Error;

/// A single rejected input field, e.g. `flashcards[3].front`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Generation not found: {0}")]
    GenerationNotFound(String),

    #[error("Rate limit exceeded: at most {limit} generations per hour")]
    RateLimited { limit: u32 },

    #[error("Flashcard generation failed: {0}")]
    GenerationFailed(ServiceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlashcardError {
    pub fn validation(fields: Vec<FieldError>) -> Self {
        let message = match fields.as_slice() {
            [only] => format!("{}: {}", only.field, only.message),
            _ => format!("{} invalid fields", fields.len()),
        };
        FlashcardError::Validation { message, fields }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FlashcardError::Validation { .. } => "VALIDATION_ERROR",
            FlashcardError::Forbidden(_) => "FORBIDDEN",
            FlashcardError::DeckNotFound(_) => "DECK_NOT_FOUND",
            FlashcardError::GenerationNotFound(_) => "GENERATION_NOT_FOUND",
            FlashcardError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            FlashcardError::GenerationFailed(_) => "AI_GENERATION_FAILED",
            FlashcardError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            FlashcardError::Validation { .. } => 400,
            FlashcardError::Forbidden(_) => 403,
            FlashcardError::DeckNotFound(_) | FlashcardError::GenerationNotFound(_) => 404,
            FlashcardError::RateLimited { .. } => 429,
            FlashcardError::GenerationFailed(_) => 422,
            FlashcardError::Internal(_) => 500,
        }
    }

    /// Message safe to show the caller. Provider and store detail stays in
    /// the server log.
    pub fn public_message(&self) -> String {
        match self {
            FlashcardError::GenerationFailed(_) => {
                "Flashcard generation failed, please try again later".to_string()
            }
            FlashcardError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Structured detail safe to show the caller
    pub fn public_details(&self) -> Option<serde_json::Value> {
        match self {
            FlashcardError::Validation { fields, .. } => {
                Some(serde_json::json!({ "fields": fields }))
            }
            FlashcardError::RateLimited { limit } => {
                Some(serde_json::json!({ "limit_per_hour": limit }))
            }
            FlashcardError::GenerationFailed(err) => Some(serde_json::json!({ "reason": err.code })),
            _ => None,
        }
    }
}

impl From<StoreError> for FlashcardError {
    fn from(err: StoreError) -> Self {
        FlashcardError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FlashcardError>;
