//! Error contract for question operations.
//!
//! Content- and identity-level outcomes (rate limited, blocked, not found)
//! are part of the normal contract and map to client-facing responses;
//! store failures are the only internal errors a request path can surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuestionError {
    /// Author is inside the submission cooldown window.
    #[error("Rate limit exceeded. Please wait before submitting another question.")]
    RateLimited,

    /// Moderation flagged the text. The question is persisted with terminal
    /// blocked status for audit, but never enqueued or broadcast.
    #[error("Question blocked by content moderation")]
    ContentBlocked { reason: Option<String> },

    #[error("Question not found")]
    NotFound,

    /// Document store failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IntoResponse for QuestionError {
    fn into_response(self) -> Response {
        let (status, error, reason) = match self {
            QuestionError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string(), None)
            }
            QuestionError::ContentBlocked { ref reason } => {
                (StatusCode::BAD_REQUEST, self.to_string(), reason.clone())
            }
            QuestionError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), None),
            QuestionError::Store(ref e) => {
                tracing::error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, reason })).into_response()
    }
}
