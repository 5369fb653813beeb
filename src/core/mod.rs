pub mod credentials;
pub mod flashcards;
pub mod llm;
pub mod logging;
