//! Integration tests for the question lifecycle: submission through
//! moderation and rate limiting, the claim-based answer worker, and the
//! fanout contract. All external collaborators are mocks; the mock store
//! reproduces the document store's conditional-write semantics.

use std::sync::Arc;
use std::time::Duration;

use api_core::domains::questions::models::{CreateQuestionRequest, Question, QuestionStatus};
use api_core::domains::questions::rate_limit::RateLimiter;
use api_core::domains::questions::worker::{run_answer_tick, TickOutcome};
use api_core::domains::questions::{QuestionEngine, QuestionError};
use api_core::kernel::test_dependencies::{
    MockAI, MockBroadcast, MockModeration, MockQuestionStore,
};
use api_core::kernel::{BaseQuestionStore, ModerationVerdict, ServerDeps};

struct TestHarness {
    deps: Arc<ServerDeps>,
    engine: QuestionEngine,
    store: Arc<MockQuestionStore>,
    broadcast: Arc<MockBroadcast>,
    ai: Arc<MockAI>,
}

fn harness(ai: MockAI, moderation: MockModeration, broadcast: MockBroadcast) -> TestHarness {
    let store = Arc::new(MockQuestionStore::new());
    let ai = Arc::new(ai);
    let broadcast = Arc::new(broadcast);
    let deps = Arc::new(ServerDeps::new(
        store.clone(),
        ai.clone(),
        Arc::new(moderation),
        broadcast.clone(),
        Arc::new(RateLimiter::new(Duration::from_secs(20))),
        Duration::from_secs(5),
    ));
    TestHarness {
        engine: QuestionEngine::new(deps.clone()),
        deps,
        store,
        broadcast,
        ai,
    }
}

fn request(text: &str, author: &str) -> CreateQuestionRequest {
    CreateQuestionRequest {
        question_text: text.to_string(),
        industry: "Banking".to_string(),
        session_id: "session-1".to_string(),
        author_token: author.to_string(),
        email: None,
    }
}

fn status_of(payload: &serde_json::Value) -> &str {
    payload["status"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn submit_creates_pending_question_and_broadcasts() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    let question = t
        .engine
        .submit(request("How do I start with AI governance?", "author-1"), None)
        .await
        .unwrap();

    assert_eq!(question.status, "pending");
    assert!(question.answer.is_none());
    assert_eq!(
        t.store.get(question.id).unwrap().status,
        QuestionStatus::Pending.to_string()
    );

    let events = t.broadcast.group_events("session-1");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "questionCreated");
    assert_eq!(
        events[0].1["questionText"],
        "How do I start with AI governance?"
    );
}

#[tokio::test]
async fn second_submission_within_cooldown_is_rejected() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    t.engine
        .submit(request("first question", "author-1"), None)
        .await
        .unwrap();

    let result = t
        .engine
        .submit(request("second question", "author-1"), None)
        .await;
    assert!(matches!(result, Err(QuestionError::RateLimited)));
    assert_eq!(t.store.len(), 1);

    // Other authors are unaffected
    t.engine
        .submit(request("different author", "author-2"), None)
        .await
        .unwrap();
    assert_eq!(t.store.len(), 2);
}

#[tokio::test]
async fn flagged_submission_is_persisted_blocked_but_silent() {
    let t = harness(
        MockAI::new(),
        MockModeration::flagging("badword", "Hate content detected"),
        MockBroadcast::new(),
    );

    let result = t
        .engine
        .submit(request("something with badword inside", "author-1"), None)
        .await;
    match result {
        Err(QuestionError::ContentBlocked { reason }) => {
            assert_eq!(reason.as_deref(), Some("Hate content detected"));
        }
        other => panic!("expected ContentBlocked, got {:?}", other.map(|q| q.status)),
    }

    // Persisted for audit, but invisible to the wall and the worker
    assert_eq!(t.store.len(), 1);
    assert!(t.broadcast.calls().is_empty());
    assert_eq!(run_answer_tick(&t.deps).await.unwrap(), TickOutcome::Idle);

    // The author still sees it in their own history
    let history = t.engine.list_by_author("author-1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, QuestionStatus::Blocked.to_string());

    let feed = t.engine.list_by_session("session-1").await.unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn answer_tick_answers_the_question_end_to_end() {
    let t = harness(
        MockAI::new().with_response("Start with a risk inventory."),
        MockModeration::allow_all(),
        MockBroadcast::new(),
    );

    let question = t
        .engine
        .submit(request("How do I start with AI governance?", "author-1"), None)
        .await
        .unwrap();

    let outcome = run_answer_tick(&t.deps).await.unwrap();
    assert_eq!(outcome, TickOutcome::Answered(question.id));

    let stored = t.store.get(question.id).unwrap();
    assert_eq!(stored.status, QuestionStatus::Answered.to_string());
    assert_eq!(stored.answer.as_deref(), Some("Start with a risk inventory."));

    // The declared industry shapes the system prompt
    let calls = t.ai.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("Banking"));
    assert_eq!(calls[0].1, "How do I start with AI governance?");

    // Exactly one fanout per transition: created, answering, answered
    let events = t.broadcast.group_events("session-1");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].0, "questionCreated");
    assert_eq!(events[1].0, "questionAnswered");
    assert_eq!(status_of(&events[1].1), "answering");
    assert_eq!(events[2].0, "questionAnswered");
    assert_eq!(status_of(&events[2].1), "answered");
    assert_eq!(events[2].1["answer"], "Start with a risk inventory.");

    // The author additionally gets a personalized copy of the final state
    let personal = t.broadcast.user_events("author-1");
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].0, "questionAnswered");
    assert_eq!(status_of(&personal[0].1), "answered");

    // Terminal: the next tick finds nothing to claim
    assert_eq!(run_answer_tick(&t.deps).await.unwrap(), TickOutcome::Idle);
}

#[tokio::test]
async fn tick_with_no_pending_questions_is_idle() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());
    assert_eq!(run_answer_tick(&t.deps).await.unwrap(), TickOutcome::Idle);
    assert!(t.ai.calls().is_empty());
}

#[tokio::test]
async fn completion_failure_reverts_to_pending_then_retries() {
    let t = harness(
        MockAI::new()
            .with_error("upstream unavailable")
            .with_response("Second attempt answer."),
        MockModeration::allow_all(),
        MockBroadcast::new(),
    );

    let question = t
        .engine
        .submit(request("a sturdy question", "author-1"), None)
        .await
        .unwrap();

    let outcome = run_answer_tick(&t.deps).await.unwrap();
    assert_eq!(outcome, TickOutcome::Reverted(question.id));

    let stored = t.store.get(question.id).unwrap();
    assert_eq!(stored.status, QuestionStatus::Pending.to_string());
    assert!(stored.answer.is_none());

    // No event for the silent revert: created + answering only so far
    let events = t.broadcast.group_events("session-1");
    assert_eq!(events.len(), 2);
    assert_eq!(status_of(&events[1].1), "answering");

    // At-least-once: a later tick claims it again and succeeds
    let outcome = run_answer_tick(&t.deps).await.unwrap();
    assert_eq!(outcome, TickOutcome::Answered(question.id));
    let stored = t.store.get(question.id).unwrap();
    assert_eq!(stored.answer.as_deref(), Some("Second attempt answer."));

    let events = t.broadcast.group_events("session-1");
    let answered: Vec<_> = events
        .iter()
        .filter(|(_, p)| status_of(p) == "answered")
        .collect();
    assert_eq!(answered.len(), 1);
}

#[tokio::test]
async fn losing_the_claim_makes_no_further_writes() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    let question = t
        .engine
        .submit(request("contested question", "author-1"), None)
        .await
        .unwrap();

    // Simulate a concurrent invocation winning the conditional write
    t.store.fail_next_claims(1);
    let outcome = run_answer_tick(&t.deps).await.unwrap();
    assert_eq!(outcome, TickOutcome::ClaimLost);

    // The losing tick touched nothing: no AI call, no extra fanout
    assert!(t.ai.calls().is_empty());
    assert_eq!(t.broadcast.group_events("session-1").len(), 1);
    assert_eq!(
        t.store.get(question.id).unwrap().status,
        QuestionStatus::Pending.to_string()
    );
}

#[tokio::test]
async fn concurrent_ticks_answer_exactly_once() {
    let t = harness(
        MockAI::new()
            .with_delay(Duration::from_millis(50))
            .with_response("The only answer."),
        MockModeration::allow_all(),
        MockBroadcast::new(),
    );

    let question = t
        .engine
        .submit(request("raced question", "author-1"), None)
        .await
        .unwrap();

    let (a, b) = tokio::join!(run_answer_tick(&t.deps), run_answer_tick(&t.deps));
    let outcomes = [a.unwrap(), b.unwrap()];

    let winners = outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Answered(_)))
        .count();
    assert_eq!(winners, 1);

    let stored = t.store.get(question.id).unwrap();
    assert_eq!(stored.status, QuestionStatus::Answered.to_string());
    assert_eq!(stored.answer.as_deref(), Some("The only answer."));

    // One answering emission and one answered emission, total
    let events = t.broadcast.group_events("session-1");
    let answering = events.iter().filter(|(_, p)| status_of(p) == "answering").count();
    let answered = events.iter().filter(|(_, p)| status_of(p) == "answered").count();
    assert_eq!(answering, 1);
    assert_eq!(answered, 1);
}

#[tokio::test]
async fn conditional_claim_is_exclusive() {
    let store = MockQuestionStore::new();
    let question = Question::new(
        request("claimable", "author-1"),
        ModerationVerdict::default(),
        None,
    );
    store.create(&question).await.unwrap();

    assert!(store.try_claim(question.id).await.unwrap());
    assert!(!store.try_claim(question.id).await.unwrap());

    // Releasing makes it claimable again; answering terminally does not
    store.release_claim(question.id).await.unwrap();
    assert!(store.try_claim(question.id).await.unwrap());
    store.complete_answer(question.id, "done").await.unwrap();
    assert!(!store.try_claim(question.id).await.unwrap());
}

#[tokio::test]
async fn hide_broadcasts_identity_only() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    let question = t
        .engine
        .submit(request("soon hidden", "author-1"), None)
        .await
        .unwrap();

    t.engine.hide(question.id).await.unwrap();
    assert!(t.store.is_empty());

    let events = t.broadcast.group_events("session-1");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].0, "questionHidden");
    // Identity only - the content is not re-broadcast
    assert_eq!(events[1].1, serde_json::json!({ "id": question.id }));
}

#[tokio::test]
async fn hiding_a_missing_question_is_not_found_and_silent() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    let result = t.engine.hide(uuid::Uuid::now_v7()).await;
    assert!(matches!(result, Err(QuestionError::NotFound)));
    assert!(t.broadcast.calls().is_empty());
}

#[tokio::test]
async fn session_feed_is_newest_first_and_excludes_blocked() {
    let t = harness(MockAI::new(), MockModeration::allow_all(), MockBroadcast::new());

    let mut oldest = Question::new(
        request("oldest", "author-1"),
        ModerationVerdict::default(),
        None,
    );
    oldest.created_at = oldest.created_at - chrono::Duration::seconds(120);
    let mut middle = Question::new(
        request("middle", "author-2"),
        ModerationVerdict::default(),
        None,
    );
    middle.created_at = middle.created_at - chrono::Duration::seconds(60);
    let mut blocked = Question::new(
        request("rejected", "author-1"),
        ModerationVerdict {
            flagged: true,
            reason: Some("Hate content detected".to_string()),
        },
        None,
    );
    blocked.created_at = blocked.created_at - chrono::Duration::seconds(30);
    let newest = Question::new(
        request("newest", "author-1"),
        ModerationVerdict::default(),
        None,
    );

    for q in [&oldest, &middle, &blocked, &newest] {
        t.store.create(q).await.unwrap();
    }

    let feed = t.engine.list_by_session("session-1").await.unwrap();
    let texts: Vec<_> = feed.iter().map(|q| q.question_text.as_str()).collect();
    assert_eq!(texts, vec!["newest", "middle", "oldest"]);

    // Personal history shows everything, including the blocked one
    let history = t.engine.list_by_author("author-1").await.unwrap();
    let texts: Vec<_> = history.iter().map(|q| q.question_text.as_str()).collect();
    assert_eq!(texts, vec!["newest", "rejected", "oldest"]);

    // The worker still drains oldest-first
    let next = t.store.find_oldest_pending().await.unwrap().unwrap();
    assert_eq!(next.question_text, "oldest");
}

#[tokio::test]
async fn broadcast_failure_never_fails_a_transition() {
    let t = harness(
        MockAI::new().with_response("Still answered."),
        MockModeration::allow_all(),
        MockBroadcast::failing(),
    );

    let question = t
        .engine
        .submit(request("resilient question", "author-1"), None)
        .await
        .unwrap();

    let outcome = run_answer_tick(&t.deps).await.unwrap();
    assert_eq!(outcome, TickOutcome::Answered(question.id));
    assert_eq!(
        t.store.get(question.id).unwrap().answer.as_deref(),
        Some("Still answered.")
    );

    t.engine.hide(question.id).await.unwrap();
    assert!(t.store.is_empty());
}
