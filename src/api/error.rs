//! HTTP error mapping
//!
//! Every failure leaves the API as
//! `{ "error": { "code", "message", "details"? } }`.

use crate::core::flashcards::FlashcardError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or empty X-User-Id header")]
    Unauthorized,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Flashcards(#[from] FlashcardError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Flashcards(err) => {
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::MalformedBody(_) => "VALIDATION_ERROR",
            ApiError::Flashcards(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || matches!(self, ApiError::Flashcards(FlashcardError::GenerationFailed(_))) {
            log::error!("Request failed [{}]: {}", self.code(), self);
        } else {
            log::debug!("Request rejected [{}]: {}", self.code(), self);
        }

        let (message, details) = match &self {
            ApiError::Flashcards(err) => (err.public_message(), err.public_details()),
            other => (other.to_string(), None),
        };

        let mut error = serde_json::json!({
            "code": self.code(),
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(serde_json::json!({ "error": error }))).into_response()
    }
}
