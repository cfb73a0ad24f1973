//! Question lifecycle engine.
//!
//! Owns every status transition and pairs each successful one with exactly
//! one fanout emission to the owning session. The worker drives the
//! pending -> answering -> answered path through the store's conditional
//! writes (see `worker`); this engine mediates everything request-driven:
//! submission, hiding, and the two feeds.

use std::sync::Arc;
use uuid::Uuid;

use crate::domains::questions::error::QuestionError;
use crate::domains::questions::fanout::{self, EVENT_QUESTION_CREATED, EVENT_QUESTION_HIDDEN};
use crate::domains::questions::models::{CreateQuestionRequest, Question, QuestionMeta};
use crate::kernel::ServerDeps;

pub struct QuestionEngine {
    deps: Arc<ServerDeps>,
}

impl QuestionEngine {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    /// Submit a new question: rate limit, moderate, persist, broadcast.
    ///
    /// Flagged text is still persisted (terminal blocked, for audit) but is
    /// reported as blocked to the caller, never enqueued, and never
    /// broadcast.
    pub async fn submit(
        &self,
        request: CreateQuestionRequest,
        meta: Option<QuestionMeta>,
    ) -> Result<Question, QuestionError> {
        if !self.deps.rate_limiter.allow(&request.author_token) {
            return Err(QuestionError::RateLimited);
        }

        let verdict = self.deps.moderation.classify(&request.question_text).await;
        let question = Question::new(request, verdict.clone(), meta);
        self.deps.store.create(&question).await?;

        if verdict.flagged {
            tracing::warn!(
                question_id = %question.id,
                reason = ?verdict.reason,
                "Question blocked by moderation"
            );
            return Err(QuestionError::ContentBlocked {
                reason: verdict.reason,
            });
        }

        fanout::emit_to_session(
            &self.deps,
            &question.session_id,
            EVENT_QUESTION_CREATED,
            &question,
        )
        .await;

        tracing::info!(
            question_id = %question.id,
            session_id = %question.session_id,
            "Question created"
        );
        Ok(question)
    }

    /// Remove a question from the wall. Subscribers only learn the id; the
    /// content is not re-broadcast.
    pub async fn hide(&self, id: Uuid) -> Result<(), QuestionError> {
        let question = self
            .deps
            .store
            .find_by_id(id)
            .await?
            .ok_or(QuestionError::NotFound)?;

        // A concurrent hide may have won between the read and the delete
        if !self.deps.store.delete(id).await? {
            return Err(QuestionError::NotFound);
        }

        fanout::emit_to_session(
            &self.deps,
            &question.session_id,
            EVENT_QUESTION_HIDDEN,
            &serde_json::json!({ "id": id }),
        )
        .await;

        tracing::info!(question_id = %id, "Question hidden");
        Ok(())
    }

    /// Display feed for one session: excludes blocked, newest first.
    pub async fn list_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<Question>, QuestionError> {
        Ok(self.deps.store.find_by_session(session_id).await?)
    }

    /// Personal history for one author: all statuses, newest first.
    /// Deliberately includes blocked questions — the author sees their own
    /// rejected submissions, the shared wall never does.
    pub async fn list_by_author(
        &self,
        author_token: &str,
    ) -> Result<Vec<Question>, QuestionError> {
        Ok(self.deps.store.find_by_author(author_token).await?)
    }
}
