//! Database Models
//!
//! Records persisted by the flashcard store, plus the timestamp helpers
//! every record uses.

mod deck;
mod flashcard;
mod generation;


pub use deck::DeckRecord;
pub use flashcard::{FlashcardRecord, Provenance, NEW_CARD_STATE};
pub use generation::{GenerationErrorRecord, GenerationRecord};

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 UTC timestamp (`2024-01-01T00:00:00.000Z`).
///
/// Stored timestamps must all use this format so SQL string comparison
/// orders them chronologically.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a stored timestamp
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
