//! LLM Client Module
//!
//! Talks to a remote chat-completions endpoint with:
//! - Timeout, retry with exponential backoff and jitter
//! - `Retry-After` aware rate-limit handling
//! - JSON Schema validated structured output
//! - Usage counters and last-response diagnostics
//!
//! # Module Structure
//!
//! - `client`: `ResilientModelClient` and its configuration
//! - `retry`: retry classification, backoff schedule, sleep abstraction
//! - `schema`: structured output schemas and validation
//! - `stats`: usage counters and diagnostics
//! - `types`: messages, requests, responses

pub mod client;
pub mod error;
pub mod retry;
pub mod schema;
pub mod stats;
pub mod types;

pub use client::{ClientConfig, ResilientModelClient, DEFAULT_TIMEOUT, OPENROUTER_BASE_URL};
pub use error::{LLMError, Result, ServiceError};
pub use retry::{parse_retry_after, RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
pub use schema::OutputSchema;
pub use stats::{ResponseDiagnostics, UsageCounters, UsageStats};
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, SamplingParams, TokenUsage};
