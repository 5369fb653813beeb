//! Content fingerprinting
//!
//! Generations are audited by fingerprint and length only; the source text
//! itself never reaches storage.

use sha2::{Digest, Sha256};

pub struct ContentHasher;

impl ContentHasher {
    /// Lowercase hex SHA-256 of the trimmed text
    pub fn fingerprint(text: &str) -> String {
        hex::encode(Sha256::digest(text.trim().as_bytes()))
    }

    /// Length of the trimmed text in characters
    pub fn measured_length(text: &str) -> usize {
        text.trim().chars().count()
    }
}
