//! Question submission, feeds, and hiding.
//!
//! Thin handlers: extract, call the engine, map the outcome. All lifecycle
//! logic lives in the questions domain.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Extension, Path, Query},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domains::questions::error::ErrorResponse;
use crate::domains::questions::models::{CreateQuestionRequest, QuestionMeta};
use crate::server::app::AxumAppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionResponse {
    pub id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HideQuestionResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsQuery {
    pub session_id: String,
}

/// POST /api/questions
pub async fn create_question(
    Extension(state): Extension<AxumAppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<CreateQuestionRequest>,
) -> Response {
    if body.question_text.is_empty()
        || body.industry.is_empty()
        || body.session_id.is_empty()
        || body.author_token.is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing required fields".to_string(),
                reason: None,
            }),
        )
            .into_response();
    }

    let meta = QuestionMeta {
        // Hash, never store, the caller's address
        ip_hash: Some(hex::encode(Sha256::digest(addr.ip().to_string()))),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };

    match state.engine.submit(body, Some(meta)).await {
        Ok(question) => (
            StatusCode::CREATED,
            Json(CreateQuestionResponse {
                id: question.id,
                status: question.status,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/questions?sessionId=...
pub async fn get_questions(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<QuestionsQuery>,
) -> Response {
    match state.engine.list_by_session(&query.session_id).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/questions/:id/hide
pub async fn hide_question(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.engine.hide(id).await {
        Ok(()) => Json(HideQuestionResponse { success: true }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/my/:author_token
pub async fn get_my_questions(
    Extension(state): Extension<AxumAppState>,
    Path(author_token): Path<String>,
) -> Response {
    match state.engine.list_by_author(&author_token).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => e.into_response(),
    }
}
