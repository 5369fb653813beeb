//! Provider Credentials
//!
//! Bearer tokens are resolved through a [`CredentialProvider`] and cached in
//! memory for a short TTL so a burst of calls does not re-resolve each time.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Default lifetime of a cached credential
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(300);

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Credential is empty: {0}")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, CredentialError>;

// ============================================================================
// Providers
// ============================================================================

/// Something that can hand out a bearer token
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// A fixed token, mostly for tests and local setups
#[derive(Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn resolve(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::Empty("static token".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable at resolve time
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredential {
    async fn resolve(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            Ok(_) => Err(CredentialError::Empty(self.var.clone())),
            Err(_) => Err(CredentialError::NotFound(self.var.clone())),
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// TTL cache in front of a [`CredentialProvider`].
///
/// Concurrent refreshes may both hit the provider; that is harmless because
/// resolving is idempotent.
pub struct CredentialCache {
    provider: Arc<dyn CredentialProvider>,
    ttl: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl CredentialCache {
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_CREDENTIAL_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn CredentialProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub async fn token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.token.clone());
                }
            }
        }

        let token = self.provider.resolve().await?;
        log::debug!("Resolved provider credential {}", mask_secret(&token));
        *self.cached.write().await = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    /// Drop the cached token, e.g. after the provider rejected it
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Mask a secret for display (show first 4 and last 4 chars)
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
