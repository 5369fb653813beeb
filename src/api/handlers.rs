//! HTTP Handlers

use super::auth::UserId;
use super::error::ApiError;
use super::AppState;
use crate::core::flashcards::{AcceptanceInput, GenerationInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/decks/:deck_id/generations`
pub async fn create_generation(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(deck_id): Path<String>,
    body: Result<Json<GenerationInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let outcome = state.orchestrator.generate(&user_id, &deck_id, &input).await?;
    Ok((StatusCode::OK, Json(outcome)).into_response())
}

/// `POST /api/generations/:generation_id/accept`
pub async fn accept_generation(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(generation_id): Path<String>,
    body: Result<Json<AcceptanceInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let outcome = state.acceptance.accept(&user_id, &generation_id, &input).await?;
    Ok((StatusCode::CREATED, Json(outcome)).into_response())
}

/// `GET /api/llm/usage`: client counters and last response diagnostics
pub async fn llm_usage(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = match &state.client {
        Some(client) => {
            let usage = client.usage();
            serde_json::json!({
                "live_enabled": true,
                "usage": usage,
                "avg_latency_ms": usage.avg_latency_ms(),
                "success_rate": usage.success_rate(),
                "last_response": client.last_response(),
            })
        }
        None => serde_json::json!({
            "live_enabled": false,
            "usage": crate::core::llm::UsageStats::default(),
            "last_response": null,
        }),
    };
    Json(body)
}
