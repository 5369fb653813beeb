//! HTTP API
//!
//! axum router over the generation and acceptance workflows.

mod auth;
mod error;
mod handlers;

pub use auth::{UserId, USER_ID_HEADER};
pub use error::ApiError;

use crate::config::AppConfig;
use crate::core::credentials::{CredentialCache, EnvCredential};
use crate::core::flashcards::{
    AcceptanceWorkflow, CardGenerator, GenerationOrchestrator, ModelCardGenerator, OfflineCardGenerator, RateLimiter,
};
use crate::core::llm::{LLMError, ResilientModelClient};
use crate::database::Database;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared handler state
pub struct AppState {
    pub orchestrator: GenerationOrchestrator,
    pub acceptance: AcceptanceWorkflow,
    /// Present when live generation is enabled
    pub client: Option<Arc<ResilientModelClient>>,
}

impl AppState {
    /// Wire the workflows over one database, picking the live or offline
    /// generator from config.
    pub fn from_config(config: &AppConfig, db: Database) -> Result<Self, LLMError> {
        let db = Arc::new(db);
        let settings = config.generation.settings();

        let mut client = None;
        let generator: Arc<dyn CardGenerator> = if config.generation.live_enabled {
            let credentials = CredentialCache::with_ttl(
                Arc::new(EnvCredential::new(&config.llm.api_key_env)),
                config.llm.credential_ttl(),
            );
            let live = Arc::new(ResilientModelClient::with_credential_cache(
                config.llm.client_config(&settings.default_model),
                config.llm.retry_policy(),
                credentials,
            )?);
            log::info!("Live generation enabled via {}", config.llm.base_url);
            client = Some(live.clone());
            Arc::new(ModelCardGenerator::new(live))
        } else {
            log::info!("Live generation disabled, using offline generator");
            Arc::new(OfflineCardGenerator::new(config.generation.simulated_latency()))
        };

        let limiter = RateLimiter::new(db.clone(), config.generation.rate_limit_per_hour);
        let orchestrator =
            GenerationOrchestrator::new(db.clone(), db.clone(), limiter, generator).with_settings(settings);
        let acceptance = AcceptanceWorkflow::new(db.clone(), db.clone(), db);

        Ok(Self {
            orchestrator,
            acceptance,
            client,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/decks/:deck_id/generations", post(handlers::create_generation))
        .route("/api/generations/:generation_id/accept", post(handlers::accept_generation))
        .route("/api/llm/usage", get(handlers::llm_usage))
        .route("/health", get(handlers::health_check))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Flashcard API listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
