//! flashgen - AI flashcard generation service
//!
//! Turns free-form text into study flashcard suggestions through a remote
//! language model, then commits the ones the user keeps with provenance.

pub mod api;
pub mod config;
pub mod core;
pub mod database;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
