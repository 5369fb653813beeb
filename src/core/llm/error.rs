//! LLM Error Types
//!
//! `LLMError` is what the transport and retry loop work with. Every failure
//! leaves the client as a [`ServiceError`], which carries no provider wire
//! details beyond an optional `details` blob meant for logs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors that can occur while talking to the model provider
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Request timeout")]
    Timeout,

    #[error("Credential resolution failed: {0}")]
    Credential(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response does not match schema '{schema}': {}", .violations.join("; "))]
    SchemaMismatch {
        schema: String,
        violations: Vec<String>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LLMError {
    pub fn api(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        LLMError::ApiError {
            status,
            message: message.into(),
            retry_after,
        }
    }

    /// HTTP status if the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            LLMError::ApiError { status, .. } => Some(*status),
            LLMError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LLMError::ApiError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Connection-level failure where no usable response arrived
    pub fn is_transport(&self) -> bool {
        match self {
            LLMError::Timeout => true,
            LLMError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }

    /// Stable machine-readable code for this failure
    pub fn code(&self) -> &'static str {
        match self {
            LLMError::Timeout => "TIMEOUT",
            LLMError::HttpError(e) if e.is_timeout() => "TIMEOUT",
            LLMError::HttpError(_) => "NETWORK_ERROR",
            LLMError::ApiError { status: 429, .. } => "PROVIDER_RATE_LIMITED",
            LLMError::ApiError { status: 401 | 403, .. } => "PROVIDER_AUTH_ERROR",
            LLMError::ApiError { .. } => "PROVIDER_ERROR",
            LLMError::Credential(_) => "CREDENTIAL_ERROR",
            LLMError::InvalidResponse(_) | LLMError::SerializationError(_) => "INVALID_RESPONSE",
            LLMError::SchemaMismatch { .. } => "SCHEMA_VALIDATION_FAILED",
        }
    }
}

impl From<LLMError> for ServiceError {
    fn from(err: LLMError) -> Self {
        let details = match &err {
            LLMError::ApiError { status, message, .. } => Some(serde_json::json!({
                "status": status,
                "body": message,
            })),
            LLMError::SchemaMismatch { schema, violations } => Some(serde_json::json!({
                "schema": schema,
                "violations": violations,
            })),
            _ => None,
        };
        let service = ServiceError::new(err.code(), err.to_string());
        match details {
            Some(details) => service.with_details(details),
            None => service,
        }
    }
}

/// Uniform failure shape returned by the model client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;
