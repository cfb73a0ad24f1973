// Mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.
// The mock store reproduces the document store's conditional-write claim
// semantics exactly, so worker races behave the same as against Postgres.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::{BaseAI, BaseBroadcast, BaseModeration, BaseQuestionStore, ModerationVerdict};
use crate::domains::questions::models::{Question, QuestionStatus};

// =============================================================================
// Mock Question Store
// =============================================================================

pub struct MockQuestionStore {
    questions: Arc<Mutex<HashMap<Uuid, Question>>>,
    /// Number of upcoming try_claim calls that should report claim-loss,
    /// simulating a concurrent invocation winning the conditional write.
    forced_claim_losses: Arc<Mutex<usize>>,
}

impl MockQuestionStore {
    pub fn new() -> Self {
        Self {
            questions: Arc::new(Mutex::new(HashMap::new())),
            forced_claim_losses: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` try_claim calls fail as if another worker had
    /// already claimed the question.
    pub fn fail_next_claims(&self, n: usize) {
        *self.forced_claim_losses.lock().unwrap() = n;
    }

    /// Snapshot a question for assertions.
    pub fn get(&self, id: Uuid) -> Option<Question> {
        self.questions.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.questions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockQuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseQuestionStore for MockQuestionStore {
    async fn create(&self, question: &Question) -> Result<()> {
        self.questions
            .lock()
            .unwrap()
            .insert(question.id, question.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>> {
        Ok(self.questions.lock().unwrap().get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.questions.lock().unwrap().remove(&id).is_some())
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<Question>> {
        let questions = self.questions.lock().unwrap();
        let mut matching: Vec<Question> = questions
            .values()
            .filter(|q| {
                q.session_id == session_id && q.status != QuestionStatus::Blocked.to_string()
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(matching)
    }

    async fn find_by_author(&self, author_token: &str) -> Result<Vec<Question>> {
        let questions = self.questions.lock().unwrap();
        let mut matching: Vec<Question> = questions
            .values()
            .filter(|q| q.author_token == author_token)
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(matching)
    }

    async fn find_oldest_pending(&self) -> Result<Option<Question>> {
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .values()
            .filter(|q| q.status == QuestionStatus::Pending.to_string())
            .min_by_key(|q| (q.created_at, q.id))
            .cloned())
    }

    async fn try_claim(&self, id: Uuid) -> Result<bool> {
        {
            let mut forced = self.forced_claim_losses.lock().unwrap();
            if *forced > 0 {
                *forced -= 1;
                return Ok(false);
            }
        }

        // Compare-and-set under one lock, like the store's conditional write
        let mut questions = self.questions.lock().unwrap();
        match questions.get_mut(&id) {
            Some(q) if q.status == QuestionStatus::Pending.to_string() => {
                q.status = QuestionStatus::Answering.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_answer(&self, id: Uuid, answer: &str) -> Result<()> {
        let mut questions = self.questions.lock().unwrap();
        if let Some(q) = questions.get_mut(&id) {
            if q.status == QuestionStatus::Answering.to_string() {
                q.status = QuestionStatus::Answered.to_string();
                q.answer = Some(answer.to_string());
            }
        }
        Ok(())
    }

    async fn release_claim(&self, id: Uuid) -> Result<()> {
        let mut questions = self.questions.lock().unwrap();
        if let Some(q) = questions.get_mut(&id) {
            if q.status == QuestionStatus::Answering.to_string() {
                q.status = QuestionStatus::Pending.to_string();
            }
        }
        Ok(())
    }
}

// =============================================================================
// Mock AI
// =============================================================================

enum MockReply {
    Answer(String),
    Error(String),
}

pub struct MockAI {
    replies: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    delay: Option<Duration>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Queue a successful completion.
    pub fn with_response(self, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Answer(text.to_string()));
        self
    }

    /// Queue a completion failure.
    pub fn with_error(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Error(message.to_string()));
        self
    }

    /// Sleep before replying, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All (system_context, user_text) pairs this mock was called with.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, system_context: &str, user_text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_context.to_string(), user_text.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok("Mock answer.".to_string());
        }
        match replies.remove(0) {
            MockReply::Answer(text) => Ok(text),
            MockReply::Error(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

// =============================================================================
// Mock Moderation
// =============================================================================

pub struct MockModeration {
    flag_rule: Option<(String, String)>,
}

impl MockModeration {
    /// Gate that never flags anything (also what fail-open degrades to).
    pub fn allow_all() -> Self {
        Self { flag_rule: None }
    }

    /// Gate that flags any text containing `term`.
    pub fn flagging(term: &str, reason: &str) -> Self {
        Self {
            flag_rule: Some((term.to_string(), reason.to_string())),
        }
    }
}

#[async_trait]
impl BaseModeration for MockModeration {
    async fn classify(&self, text: &str) -> ModerationVerdict {
        if let Some((term, reason)) = &self.flag_rule {
            if text.contains(term.as_str()) {
                return ModerationVerdict {
                    flagged: true,
                    reason: Some(reason.clone()),
                };
            }
        }
        ModerationVerdict::default()
    }
}

// =============================================================================
// Mock Broadcast
// =============================================================================

/// One recorded push.
#[derive(Debug, Clone)]
pub struct BroadcastCall {
    pub scope: BroadcastScope,
    pub target: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastScope {
    Group(String),
    User(String),
}

pub struct MockBroadcast {
    calls: Arc<Mutex<Vec<BroadcastCall>>>,
    failing: bool,
}

impl MockBroadcast {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// Broker that rejects every push. Calls are still recorded.
    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    pub fn calls(&self) -> Vec<BroadcastCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Events pushed to a session group, as (target, payload) pairs.
    pub fn group_events(&self, session_id: &str) -> Vec<(String, serde_json::Value)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.scope == BroadcastScope::Group(session_id.to_string()))
            .map(|c| (c.target.clone(), c.payload.clone()))
            .collect()
    }

    /// Events pushed to a specific user, as (target, payload) pairs.
    pub fn user_events(&self, user_id: &str) -> Vec<(String, serde_json::Value)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.scope == BroadcastScope::User(user_id.to_string()))
            .map(|c| (c.target.clone(), c.payload.clone()))
            .collect()
    }
}

impl Default for MockBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseBroadcast for MockBroadcast {
    async fn send_to_group(
        &self,
        group: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(BroadcastCall {
            scope: BroadcastScope::Group(group.to_string()),
            target: target.to_string(),
            payload,
        });
        if self.failing {
            anyhow::bail!("mock broadcast failure");
        }
        Ok(())
    }

    async fn send_to_user(
        &self,
        user_id: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(BroadcastCall {
            scope: BroadcastScope::User(user_id.to_string()),
            target: target.to_string(),
            payload,
        });
        if self.failing {
            anyhow::bail!("mock broadcast failure");
        }
        Ok(())
    }
}
