use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::kernel::ModerationVerdict;

/// A question submitted from the audience.
///
/// `status` drives the lifecycle: `pending` questions queue for the answer
/// worker, `answering` marks an in-flight claim, `answered` and `blocked`
/// are terminal. Everything besides `status` and `answer` is immutable
/// after creation. The serialized form (camelCase) is also the fanout
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub session_id: String,
    pub question_text: String,
    pub industry: String,
    pub status: String, // 'pending', 'answering', 'answered', 'blocked'
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Opaque per-author identity (not PII); keys rate limiting and
    /// personalized fanout.
    pub author_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub moderation: Json<ModerationVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Json<QuestionMeta>>,
}

impl Question {
    /// Build a new question from a submission. UUIDv7 ids are time-ordered,
    /// so id order matches `created_at` order and breaks its ties. The
    /// initial status comes from the moderation verdict: flagged text is
    /// persisted terminally blocked, everything else starts pending.
    pub fn new(
        request: CreateQuestionRequest,
        moderation: ModerationVerdict,
        meta: Option<QuestionMeta>,
    ) -> Self {
        let status = if moderation.flagged {
            QuestionStatus::Blocked
        } else {
            QuestionStatus::Pending
        };

        Self {
            id: Uuid::now_v7(),
            session_id: request.session_id,
            question_text: request.question_text,
            industry: request.industry,
            status: status.to_string(),
            answer: None,
            created_at: Utc::now(),
            author_token: request.author_token,
            email: request.email,
            moderation: Json(moderation),
            meta: meta.map(Json),
        }
    }
}

/// Submission payload for a new question.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub industry: String,
    pub session_id: String,
    pub author_token: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Diagnostic attributes captured at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Question status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Answering,
    Answered,
    Blocked,
}

impl QuestionStatus {
    /// Terminal questions never re-enter the worker queue.
    pub fn is_terminal(self) -> bool {
        matches!(self, QuestionStatus::Answered | QuestionStatus::Blocked)
    }
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionStatus::Pending => write!(f, "pending"),
            QuestionStatus::Answering => write!(f, "answering"),
            QuestionStatus::Answered => write!(f, "answered"),
            QuestionStatus::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for QuestionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(QuestionStatus::Pending),
            "answering" => Ok(QuestionStatus::Answering),
            "answered" => Ok(QuestionStatus::Answered),
            "blocked" => Ok(QuestionStatus::Blocked),
            _ => Err(anyhow::anyhow!("Invalid question status: {}", s)),
        }
    }
}
