//! Card Generators
//!
//! `ModelCardGenerator` asks the remote model; `OfflineCardGenerator` builds
//! deterministic cards locally for environments without live generation.
//! Both fail with the uniform `ServiceError`.

use super::prompt::generation_request;
use super::types::Suggestion;
use crate::core::llm::{ResilientModelClient, ServiceError, Sleeper, TokioSleeper};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Error code for a reply with too few or blank cards
pub const AI_RESPONSE_INCOMPLETE: &str = "AI_RESPONSE_INCOMPLETE";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardGenerator: Send + Sync {
    /// Produce exactly `count` suggestions from already validated text
    async fn generate(&self, source_text: &str, model: &str, count: usize) -> Result<Vec<Suggestion>, ServiceError>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// Live Generator
// ============================================================================

#[derive(Debug, Deserialize)]
struct FlashcardsReply {
    flashcards: Vec<Suggestion>,
}

pub struct ModelCardGenerator {
    client: Arc<ResilientModelClient>,
}

impl ModelCardGenerator {
    pub fn new(client: Arc<ResilientModelClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CardGenerator for ModelCardGenerator {
    async fn generate(&self, source_text: &str, model: &str, count: usize) -> Result<Vec<Suggestion>, ServiceError> {
        let response = self
            .client
            .complete(generation_request(source_text, model, count))
            .await?;

        let parsed = match response.parsed {
            Some(value) => value,
            None => serde_json::from_str(&response.content).map_err(|e| {
                ServiceError::new("INVALID_RESPONSE", format!("reply is not JSON: {}", e))
            })?,
        };
        let reply: FlashcardsReply = serde_json::from_value(parsed).map_err(|e| {
            ServiceError::new("INVALID_RESPONSE", format!("unexpected reply shape: {}", e))
        })?;

        log::debug!(
            "Model {} returned {} card(s) in {} attempt(s)",
            response.model,
            reply.flashcards.len(),
            response.attempts
        );

        normalize_cards(reply.flashcards, count)
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Trim every card, drop extras beyond `count`, and refuse short or blank
/// replies.
pub fn normalize_cards(cards: Vec<Suggestion>, count: usize) -> Result<Vec<Suggestion>, ServiceError> {
    let received = cards.len();
    if received < count {
        return Err(ServiceError::new(
            AI_RESPONSE_INCOMPLETE,
            format!("expected {} flashcards, model returned {}", count, received),
        )
        .with_details(serde_json::json!({ "expected": count, "received": received })));
    }

    let mut out = Vec::with_capacity(count);
    for (i, card) in cards.into_iter().take(count).enumerate() {
        let front = card.front.trim();
        let back = card.back.trim();
        if front.is_empty() || back.is_empty() {
            return Err(ServiceError::new(
                AI_RESPONSE_INCOMPLETE,
                format!("flashcard {} has an empty side", i),
            )
            .with_details(serde_json::json!({ "index": i })));
        }
        out.push(Suggestion::new(front, back));
    }

    if received > count {
        log::debug!("Truncated model reply from {} to {} cards", received, count);
    }
    Ok(out)
}

// ============================================================================
// Offline Generator
// ============================================================================

/// Default simulated latency of the offline generator
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(800);

const EXCERPT_CHARS: usize = 160;

/// Deterministic stand-in: splits the text into `count` passages and makes
/// one card per passage.
pub struct OfflineCardGenerator {
    latency: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for OfflineCardGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_LATENCY)
    }
}

impl OfflineCardGenerator {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

#[async_trait]
impl CardGenerator for OfflineCardGenerator {
    async fn generate(&self, source_text: &str, _model: &str, count: usize) -> Result<Vec<Suggestion>, ServiceError> {
        self.sleeper.sleep(self.latency).await;

        let chars: Vec<char> = source_text.trim().chars().collect();
        let passage_len = (chars.len() / count.max(1)).max(1);

        let cards = (0..count)
            .map(|i| {
                let start = (i * passage_len).min(chars.len());
                let end = (start + passage_len).min(chars.len());
                let passage: String = chars[start..end].iter().collect();
                let excerpt: String = passage.trim().chars().take(EXCERPT_CHARS).collect();
                let back = if excerpt.is_empty() {
                    "(blank passage)".to_string()
                } else {
                    excerpt
                };
                Suggestion::new(format!("What does passage {} of {} say?", i + 1, count), back)
            })
            .collect();

        Ok(cards)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
