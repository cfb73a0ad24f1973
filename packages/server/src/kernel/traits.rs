// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The question
// lifecycle (who may transition what, when to broadcast) lives in the
// questions domain; these traits are the seams to the document store, the
// completion service, the moderation service, and the broadcast broker.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseBroadcast)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::questions::models::Question;

// =============================================================================
// Moderation verdict (shared by the gate and the persisted entity)
// =============================================================================

/// Outcome of classifying submitted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// =============================================================================
// AI Trait (Infrastructure - answer generation)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Generate a completion from a system context and the user's text.
    async fn complete(&self, system_context: &str, user_text: &str) -> Result<String>;
}

// =============================================================================
// Moderation Trait (Infrastructure - content classification)
// =============================================================================

#[async_trait]
pub trait BaseModeration: Send + Sync {
    /// Classify text across harm categories.
    ///
    /// Infallible surface: implementations fail OPEN (unflagged) when the
    /// collaborator is unreachable, logging the failure. Availability is
    /// deliberately chosen over strictness here.
    async fn classify(&self, text: &str) -> ModerationVerdict;
}

// =============================================================================
// Broadcast Trait (Infrastructure - push to the broker)
// =============================================================================

#[async_trait]
pub trait BaseBroadcast: Send + Sync {
    /// Push a named event to every subscriber of a session group.
    async fn send_to_group(
        &self,
        group: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()>;

    /// Push a named event to connections bound to one user identity.
    async fn send_to_user(
        &self,
        user_id: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()>;
}

// =============================================================================
// Question Store Trait (Infrastructure - document store)
// =============================================================================

#[async_trait]
pub trait BaseQuestionStore: Send + Sync {
    async fn create(&self, question: &Question) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>>;

    /// Remove a question. Returns false if it was already gone.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Session wall feed: excludes blocked questions, newest first.
    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Question>>;

    /// Personal history: every status, newest first.
    async fn find_by_author(&self, author_token: &str) -> Result<Vec<Question>>;

    /// The next question the worker should claim, if any.
    async fn find_oldest_pending(&self) -> Result<Option<Question>>;

    /// Conditional pending -> answering transition. Ok(false) means the
    /// stored status was no longer pending: another invocation holds the
    /// claim, or the question reached a terminal state.
    async fn try_claim(&self, id: Uuid) -> Result<bool>;

    /// answering -> answered, recording the generated answer.
    async fn complete_answer(&self, id: Uuid, answer: &str) -> Result<()>;

    /// answering -> pending, making the question claimable again.
    async fn release_claim(&self, id: Uuid) -> Result<()>;
}
