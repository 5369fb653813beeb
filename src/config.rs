use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::flashcards::orchestrator::{DEFAULT_ALLOWED_MODELS, DEFAULT_CARD_COUNT, DEFAULT_MODEL};
use crate::core::flashcards::rate_limiter::DEFAULT_HOURLY_LIMIT;
use crate::core::flashcards::GenerationSettings;
use crate::core::llm::{ClientConfig, RetryPolicy, SamplingParams, OPENROUTER_BASE_URL};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FLASHGEN_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Model provider connection and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Environment variable holding the bearer token. The token itself never
    /// lives in the config file.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_factor: f64,
    pub max_backoff_ms: u64,
    pub jitter_ratio: f64,
    pub credential_ttl_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub app_referer: Option<String>,
    pub app_title: Option<String>,
}

/// Generation pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Call the remote model; when false the offline generator is used.
    pub live_enabled: bool,
    pub simulated_latency_ms: u64,
    pub default_model: String,
    pub allowed_models: Vec<String>,
    pub default_count: i64,
    pub rate_limit_per_hour: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 60,
            max_attempts: 3,
            backoff_base_ms: 1000,
            backoff_factor: 2.0,
            max_backoff_ms: 30_000,
            jitter_ratio: 0.25,
            credential_ttl_secs: 300,
            temperature: 0.7,
            max_tokens: 4000,
            app_referer: None,
            app_title: Some("flashgen".to_string()),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            live_enabled: false,
            simulated_latency_ms: 800,
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
            default_count: DEFAULT_CARD_COUNT,
            rate_limit_per_hour: DEFAULT_HOURLY_LIMIT,
        }
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.backoff_base_ms),
            factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_backoff_ms),
            jitter_ratio: self.jitter_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn client_config(&self, default_model: &str) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            default_model: default_model.to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            default_sampling: SamplingParams {
                temperature: Some(self.temperature),
                max_tokens: Some(self.max_tokens),
                ..Default::default()
            },
            referer: self.app_referer.clone(),
            title: self.app_title.clone(),
        }
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }
}

impl GenerationConfig {
    pub fn settings(&self) -> GenerationSettings {
        let mut allowed_models = self.allowed_models.clone();
        if !allowed_models.contains(&self.default_model) {
            allowed_models.push(self.default_model.clone());
        }
        GenerationSettings {
            default_model: self.default_model.clone(),
            allowed_models,
            default_count: self.default_count,
        }
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl AppConfig {
    /// Load configuration from `$FLASHGEN_CONFIG` or
    /// `~/.config/flashgen/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents, &config_path),
            Err(_) => {
                log::debug!("No config file at {}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    fn parse(contents: &str, path: &std::path::Path) -> Self {
        match toml::from_str(contents) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config at {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("flashgen"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("flashgen").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
