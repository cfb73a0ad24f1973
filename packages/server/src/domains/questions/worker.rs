//! Claim-based answer worker.
//!
//! Runs on a timer. Each tick claims at most the single oldest pending
//! question via the store's conditional write, generates an answer, and
//! publishes each transition. Ticks may overlap arbitrarily (slow
//! completions, multiple instances on one schedule); the conditional claim
//! is the only thing that keeps two invocations from answering the same
//! question twice, and it is sufficient.

use anyhow::Result;
use uuid::Uuid;

use crate::domains::questions::fanout::{self, EVENT_QUESTION_ANSWERED};
use crate::domains::questions::models::{Question, QuestionStatus};
use crate::domains::questions::prompts;
use crate::kernel::ServerDeps;

/// What one tick did. Claim loss is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No pending question to work.
    Idle,
    /// A concurrent invocation won the conditional write; this tick made
    /// no further writes to the question.
    ClaimLost,
    /// Question answered and published.
    Answered(Uuid),
    /// Completion failed or timed out; the claim was released so a later
    /// tick retries. Answering is at-least-once, not exactly-once.
    Reverted(Uuid),
}

pub async fn run_answer_tick(deps: &ServerDeps) -> Result<TickOutcome> {
    let Some(mut question) = deps.store.find_oldest_pending().await? else {
        tracing::debug!("No pending questions");
        return Ok(TickOutcome::Idle);
    };

    // The claim doubles as the status transition: a conditional write that
    // only succeeds while the stored row is still pending.
    if !deps.store.try_claim(question.id).await? {
        tracing::debug!(question_id = %question.id, "Claim lost to a concurrent tick");
        return Ok(TickOutcome::ClaimLost);
    }

    question.status = QuestionStatus::Answering.to_string();
    fanout::emit_to_session(
        deps,
        &question.session_id,
        EVENT_QUESTION_ANSWERED,
        &question,
    )
    .await;

    match answer(deps, &question).await {
        Ok(answer_text) => {
            deps.store.complete_answer(question.id, &answer_text).await?;
            question.status = QuestionStatus::Answered.to_string();
            question.answer = Some(answer_text);

            fanout::emit_to_session(
                deps,
                &question.session_id,
                EVENT_QUESTION_ANSWERED,
                &question,
            )
            .await;
            fanout::emit_to_author(
                deps,
                &question.author_token,
                EVENT_QUESTION_ANSWERED,
                &question,
            )
            .await;

            tracing::info!(question_id = %question.id, "Answered question");
            Ok(TickOutcome::Answered(question.id))
        }
        Err(e) => {
            // Release the claim so a later tick retries. No fanout: the
            // wall already shows "answering" and the retry will supersede
            // it.
            tracing::error!(
                question_id = %question.id,
                error = %e,
                "Answer generation failed; releasing claim for retry"
            );
            deps.store.release_claim(question.id).await?;
            Ok(TickOutcome::Reverted(question.id))
        }
    }
}

/// Generate the answer under the configured upper-bound timeout. A timeout
/// is indistinguishable from any other completion failure to the caller.
async fn answer(deps: &ServerDeps, question: &Question) -> Result<String> {
    let system_prompt = prompts::answer_system_prompt(&question.industry);

    match tokio::time::timeout(
        deps.completion_timeout,
        deps.ai.complete(&system_prompt, &question.question_text),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => anyhow::bail!(
            "completion timed out after {:?}",
            deps.completion_timeout
        ),
    }
}
