//! Resilient Model Client
//!
//! OpenAI-compatible chat-completions client (OpenRouter by default) with a
//! hard per-attempt timeout, retry with backoff and jitter, `Retry-After`
//! handling, and JSON Schema validation of structured replies.

use super::error::{LLMError, Result, ServiceError};
use super::retry::{parse_retry_after, RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
use super::schema::OutputSchema;
use super::stats::{LastResponse, ResponseDiagnostics, UsageCounters, UsageStats};
use super::types::{ChatRequest, ChatResponse, SamplingParams, TokenUsage};
use crate::core::credentials::{CredentialCache, CredentialProvider};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default hard timeout for a single attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_model: String,
    pub timeout: Duration,
    pub default_sampling: SamplingParams,
    /// Optional `HTTP-Referer` attribution header
    pub referer: Option<String>,
    /// Optional `X-Title` attribution header
    pub title: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            default_model: "openai/gpt-4o-mini".to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_sampling: SamplingParams::default(),
            referer: None,
            title: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_sampling(mut self, sampling: SamplingParams) -> Self {
        self.default_sampling = sampling;
        self
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
    /// Some gateways report upstream failures inside a 200 body
    #[serde(default)]
    error: Option<CompletionError>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Chat-completions client shared by all request handlers.
///
/// Safe to share behind an `Arc`: the credential cache sits behind an async
/// lock and the counters are atomics.
pub struct ResilientModelClient {
    config: ClientConfig,
    policy: RetryPolicy,
    http: Client,
    credentials: CredentialCache,
    sleeper: Arc<dyn Sleeper>,
    counters: UsageCounters,
    last_response: LastResponse,
}

impl ResilientModelClient {
    pub fn new(
        config: ClientConfig,
        policy: RetryPolicy,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        Self::with_credential_cache(config, policy, CredentialCache::new(credentials))
    }

    pub fn with_credential_cache(
        config: ClientConfig,
        policy: RetryPolicy,
        credentials: CredentialCache,
    ) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            policy,
            http,
            credentials,
            sleeper: Arc::new(TokioSleeper),
            counters: UsageCounters::default(),
            last_response: LastResponse::default(),
        })
    }

    /// Replace the wait source (tests use a recording fake)
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn usage(&self) -> UsageStats {
        self.counters.snapshot()
    }

    pub fn last_response(&self) -> Option<ResponseDiagnostics> {
        self.last_response.get()
    }

    /// Wire payload for a request: messages, merged sampling parameters and
    /// the optional `response_format` directive.
    pub fn build_payload(&self, request: &ChatRequest) -> serde_json::Value {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let sampling = self.config.default_sampling.merged_with(&request.sampling);

        let mut body = serde_json::json!({
            "model": model,
            "messages": request.wire_messages(),
        });

        if let (Some(map), Ok(serde_json::Value::Object(params))) =
            (body.as_object_mut(), serde_json::to_value(&sampling))
        {
            map.extend(params);
        }

        if let Some(schema) = &request.response_format {
            body["response_format"] = schema.response_format();
        }

        body
    }

    /// Run a completion to a validated result, retrying transient failures.
    pub async fn complete(&self, request: ChatRequest) -> std::result::Result<ChatResponse, ServiceError> {
        let payload = self.build_payload(&request);
        let schema = request.response_format.as_ref();

        let token = match self.credentials.token().await {
            Ok(token) => token,
            Err(e) => {
                log::error!("Cannot resolve provider credential: {}", e);
                self.counters.record_failure();
                return Err(LLMError::Credential(e.to_string()).into());
            }
        };

        let mut attempt: u32 = 0;
        let mut backoff_step: u32 = 0;

        loop {
            attempt += 1;
            let error = match self.send_once(&payload, &token, schema).await {
                Ok(mut response) => {
                    response.attempts = attempt;
                    self.counters
                        .record_success(response.latency_ms, response.usage.as_ref());
                    return Ok(response);
                }
                Err(error) => error,
            };

            if matches!(error.status(), Some(401)) {
                self.credentials.invalidate().await;
            }

            let wait = match self.policy.classify(&error) {
                RetryDecision::Fail => None,
                _ if attempt >= self.policy.max_attempts => None,
                RetryDecision::RetryAfter(wait) => Some(wait),
                RetryDecision::Backoff => {
                    backoff_step += 1;
                    Some(self.policy.jittered_delay(backoff_step))
                }
            };

            let Some(wait) = wait else {
                log::error!(
                    "Model request failed after {} attempt(s) [{}]: {}",
                    attempt,
                    error.code(),
                    error
                );
                self.counters.record_failure();
                return Err(error.into());
            };

            log::warn!(
                "Model request attempt {}/{} failed, retrying in {}ms: {}",
                attempt,
                self.policy.max_attempts,
                wait.as_millis(),
                error
            );
            self.counters.record_retry();
            self.sleeper.sleep(wait).await;
        }
    }

    async fn send_once(
        &self,
        payload: &serde_json::Value,
        token: &str,
        schema: Option<&OutputSchema>,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let mut req_builder = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json");

        if let Some(referer) = &self.config.referer {
            req_builder = req_builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            req_builder = req_builder.header("X-Title", title);
        }

        let start = Instant::now();
        let resp = req_builder.json(payload).send().await.map_err(map_transport)?;
        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        self.last_response.set(ResponseDiagnostics::from_response(
            status.as_u16(),
            latency,
            resp.headers(),
        ));

        if !status.is_success() {
            let retry_after = if status.as_u16() == 429 {
                resp.headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after)
            } else {
                None
            };
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::api(status.as_u16(), error_message(&text), retry_after));
        }

        let text = resp.text().await.map_err(map_transport)?;
        let body: CompletionBody = serde_json::from_str(&text)
            .map_err(|e| LLMError::InvalidResponse(format!("malformed completion body: {}", e)))?;

        if let Some(err) = body.error {
            return Err(LLMError::api(
                err.code.unwrap_or(502),
                err.message.unwrap_or_else(|| "upstream provider error".to_string()),
                None,
            ));
        }

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("response has no choices".to_string()))?;
        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LLMError::InvalidResponse("assistant message is empty".to_string()))?;

        let parsed = match schema {
            Some(schema) => match schema.parse_and_validate(&content) {
                Ok(value) => Some(value),
                Err(e) => {
                    if let LLMError::SchemaMismatch { violations, .. } = &e {
                        log::warn!("Structured reply failed validation: {:?}", violations);
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        let model = body.model.unwrap_or_else(|| {
            payload["model"].as_str().unwrap_or_default().to_string()
        });

        Ok(ChatResponse {
            content,
            parsed,
            model,
            usage: body
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            finish_reason: choice.finish_reason,
            latency_ms: latency,
            attempts: 1,
        })
    }
}

fn map_transport(err: reqwest::Error) -> LLMError {
    if err.is_timeout() {
        LLMError::Timeout
    } else {
        LLMError::HttpError(err)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, or fall back to
/// the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(500).collect())
}
