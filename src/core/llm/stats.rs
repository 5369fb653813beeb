//! Client Statistics
//!
//! Aggregate usage counters and last-response diagnostics. Counters are
//! best-effort observability and never feed back into request handling.

use super::types::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Headers worth keeping for diagnostics
const DIAGNOSTIC_HEADERS: &[&str] = &[
    "content-type",
    "retry-after",
    "x-request-id",
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "x-ratelimit-reset",
    "openai-processing-ms",
];

/// Lock-free request counters shared across concurrent calls
#[derive(Debug, Default)]
pub struct UsageCounters {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    retries: AtomicU64,
    total_latency_ms: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl UsageCounters {
    pub fn record_success(&self, latency_ms: u64, usage: Option<&TokenUsage>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        if let Some(u) = usage {
            self.input_tokens.fetch_add(u.input_tokens as u64, Ordering::Relaxed);
            self.output_tokens.fetch_add(u.output_tokens as u64, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageStats {
        UsageStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            total_latency_ms: self.total_latency_ms.load(Ordering::Relaxed),
            total_input_tokens: self.input_tokens.load(Ordering::Relaxed),
            total_output_tokens: self.output_tokens.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`UsageCounters`].
///
/// `total_requests` counts logical calls, not HTTP attempts; retries are
/// counted separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub retries: u64,
    pub total_latency_ms: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

impl UsageStats {
    pub fn avg_latency_ms(&self) -> u64 {
        if self.successful_requests == 0 {
            0
        } else {
            self.total_latency_ms / self.successful_requests
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

/// What the last HTTP response looked like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDiagnostics {
    pub status: u16,
    pub latency_ms: u64,
    pub headers: BTreeMap<String, String>,
    pub recorded_at: String,
}

impl ResponseDiagnostics {
    pub fn from_response(status: u16, latency_ms: u64, headers: &reqwest::header::HeaderMap) -> Self {
        let headers = DIAGNOSTIC_HEADERS
            .iter()
            .filter_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        Self {
            status,
            latency_ms,
            headers,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Slot holding the most recent [`ResponseDiagnostics`]
#[derive(Debug, Default)]
pub struct LastResponse {
    inner: Mutex<Option<ResponseDiagnostics>>,
}

impl LastResponse {
    pub fn set(&self, diagnostics: ResponseDiagnostics) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(diagnostics);
        }
    }

    pub fn get(&self) -> Option<ResponseDiagnostics> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }
}
