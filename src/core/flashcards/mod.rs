//! Flashcard Generation Pipeline
//!
//! Generate suggestions from free text, let the caller curate them, then
//! accept the keepers as permanent flashcards with provenance.
//!
//! # Module Structure
//!
//! - `hasher`: source text fingerprinting
//! - `rate_limiter`: trailing-hour generation ceiling
//! - `prompt`: system prompt and structured output schema
//! - `generator`: live and offline card generators
//! - `orchestrator`: the generate workflow
//! - `acceptance`: the accept workflow
//! - `store`: persistence collaborator traits

pub mod acceptance;
pub mod error;
pub mod generator;
pub mod hasher;
pub mod orchestrator;
pub mod prompt;
pub mod rate_limiter;
pub mod store;
pub mod types;

pub use acceptance::AcceptanceWorkflow;
pub use error::{FieldError, FlashcardError};
pub use generator::{CardGenerator, ModelCardGenerator, OfflineCardGenerator};
pub use hasher::ContentHasher;
pub use orchestrator::{GenerationOrchestrator, GenerationSettings};
pub use rate_limiter::RateLimiter;
pub use store::{DeckDirectory, FlashcardStore, GenerationLog};
pub use types::{
    AcceptanceInput, AcceptanceOutcome, AcceptedFlashcardInput, GenerationInput, GenerationOutcome, Suggestion,
};
