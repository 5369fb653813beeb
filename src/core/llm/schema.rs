//! Structured output schemas
//!
//! A schema is plain data (`serde_json::Value`) rather than a Rust type, so
//! callers can request any shape. Replies are checked at runtime with a
//! generic JSON Schema validator.

use super::error::{LLMError, Result};
use serde_json::Value;

/// A named JSON Schema the assistant reply must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: false,
        }
    }

    /// Strict schemas ask the provider for constrained decoding as well.
    pub fn strict(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: true,
        }
    }

    /// `response_format` directive for OpenAI-compatible endpoints
    pub fn response_format(&self) -> Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.name,
                "strict": self.strict,
                "schema": self.schema,
            }
        })
    }

    /// Parse the assistant content as JSON and validate it.
    ///
    /// Violations are reported as `<instance path>: <message>` strings.
    pub fn parse_and_validate(&self, content: &str) -> Result<Value> {
        let value: Value = serde_json::from_str(strip_code_fence(content)).map_err(|e| {
            LLMError::InvalidResponse(format!("assistant content is not valid JSON: {}", e))
        })?;
        self.validate(&value)?;
        Ok(value)
    }

    pub fn validate(&self, instance: &Value) -> Result<()> {
        let validator = jsonschema::validator_for(&self.schema).map_err(|e| {
            LLMError::InvalidResponse(format!("schema '{}' does not compile: {}", self.name, e))
        })?;

        let violations: Vec<String> = validator
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                format!("{}: {}", path, error)
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(LLMError::SchemaMismatch {
                schema: self.name.clone(),
                violations,
            })
        }
    }
}

/// Some models wrap JSON in a markdown fence even in structured mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
