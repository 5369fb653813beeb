//! Generation Orchestrator
//!
//! Validates a generation request, gates it on deck ownership and the rate
//! limiter, runs the card generator, and writes exactly one audit entry:
//! a generation record on success or an error record on failure.

use super::error::{FieldError, FlashcardError, Result};
use super::generator::CardGenerator;
use super::hasher::ContentHasher;
use super::rate_limiter::RateLimiter;
use super::store::{DeckDirectory, GenerationLog};
use super::types::{GenerationInput, GenerationOutcome};
use crate::database::{GenerationErrorRecord, GenerationRecord};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub const MIN_SOURCE_CHARS: usize = 1000;
pub const MAX_SOURCE_CHARS: usize = 10_000;
pub const MIN_CARD_COUNT: i64 = 5;
pub const MAX_CARD_COUNT: i64 = 20;
pub const DEFAULT_CARD_COUNT: i64 = 10;
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Models callers may request when none are configured
pub const DEFAULT_ALLOWED_MODELS: &[&str] = &[
    "openai/gpt-4o-mini",
    "openai/gpt-4o",
    "anthropic/claude-3.5-haiku",
    "anthropic/claude-3.5-sonnet",
    "google/gemini-flash-1.5",
    "meta-llama/llama-3.1-70b-instruct",
];

/// Request defaults and the model allow-list
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub default_model: String,
    pub allowed_models: Vec<String>,
    pub default_count: i64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
            default_count: DEFAULT_CARD_COUNT,
        }
    }
}

impl GenerationSettings {
    fn is_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }
}

/// Request after validation and defaulting
#[derive(Debug, Clone)]
struct ValidatedRequest<'a> {
    text: &'a str,
    model: String,
    count: usize,
}

pub struct GenerationOrchestrator {
    decks: Arc<dyn DeckDirectory>,
    log: Arc<dyn GenerationLog>,
    limiter: RateLimiter,
    generator: Arc<dyn CardGenerator>,
    settings: GenerationSettings,
}

impl GenerationOrchestrator {
    pub fn new(
        decks: Arc<dyn DeckDirectory>,
        log: Arc<dyn GenerationLog>,
        limiter: RateLimiter,
        generator: Arc<dyn CardGenerator>,
    ) -> Self {
        Self {
            decks,
            log,
            limiter,
            generator,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub async fn generate(&self, user_id: &str, deck_id: &str, input: &GenerationInput) -> Result<GenerationOutcome> {
        let request = self.validate(input)?;

        let deck = self
            .decks
            .find_deck(deck_id)
            .await?
            .ok_or_else(|| FlashcardError::DeckNotFound(deck_id.to_string()))?;
        if !deck.is_owned_by(user_id) {
            return Err(FlashcardError::Forbidden(format!("deck {} belongs to another user", deck_id)));
        }

        if !self.limiter.allow(user_id).await {
            info!(user_id, limit = self.limiter.limit(), "Generation refused by rate limiter");
            return Err(FlashcardError::RateLimited {
                limit: self.limiter.limit(),
            });
        }

        let fingerprint = ContentHasher::fingerprint(request.text);
        let length = ContentHasher::measured_length(request.text);

        let start = Instant::now();
        let result = self
            .generator
            .generate(request.text, &request.model, request.count)
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(suggestions) => {
                let record = GenerationRecord::new(
                    uuid::Uuid::new_v4().to_string(),
                    user_id.to_string(),
                    request.model.clone(),
                    fingerprint,
                    length,
                    suggestions.len(),
                    duration_ms,
                );

                if let Err(e) = self.log.insert_generation(&record).await {
                    error!(generation_id = %record.id, error = %e, "Failed to record generation audit entry");
                }

                info!(
                    generation_id = %record.id,
                    user_id,
                    model = %request.model,
                    generator = self.generator.name(),
                    count = suggestions.len(),
                    source_text_length = length,
                    duration_ms,
                    "Generation succeeded"
                );

                Ok(GenerationOutcome {
                    generation_id: record.id,
                    suggestions,
                    model: request.model,
                    generation_duration_ms: duration_ms,
                })
            }
            Err(failure) => {
                warn!(
                    user_id,
                    model = %request.model,
                    code = %failure.code,
                    duration_ms,
                    "Generation failed: {}",
                    failure.message
                );

                let record = GenerationErrorRecord::new(user_id, &request.model, &failure.code, &failure.message);
                if let Err(e) = self.log.insert_generation_error(&record).await {
                    error!(error = %e, "Failed to record generation error entry");
                }

                Err(FlashcardError::GenerationFailed(failure))
            }
        }
    }

    /// Check length, count and model; collect every bad field at once
    fn validate<'a>(&self, input: &'a GenerationInput) -> Result<ValidatedRequest<'a>> {
        let mut fields = Vec::new();

        let text = input.source_text.trim();
        let length = text.chars().count();
        if !(MIN_SOURCE_CHARS..=MAX_SOURCE_CHARS).contains(&length) {
            fields.push(FieldError::new(
                "source_text",
                format!(
                    "must be between {} and {} characters after trimming, got {}",
                    MIN_SOURCE_CHARS, MAX_SOURCE_CHARS, length
                ),
            ));
        }

        let count = input.count.unwrap_or(self.settings.default_count);
        if !(MIN_CARD_COUNT..=MAX_CARD_COUNT).contains(&count) {
            fields.push(FieldError::new(
                "count",
                format!("must be between {} and {}", MIN_CARD_COUNT, MAX_CARD_COUNT),
            ));
        }

        let model = input
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.settings.default_model.as_str())
            .to_string();
        if !self.settings.is_allowed(&model) {
            fields.push(FieldError::new("model", format!("model '{}' is not supported", model)));
        }

        if !fields.is_empty() {
            return Err(FlashcardError::validation(fields));
        }

        Ok(ValidatedRequest {
            text,
            model,
            count: count as usize,
        })
    }
}
