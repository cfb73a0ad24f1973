//! Best-effort fanout of lifecycle events.
//!
//! Persist-then-notify: by the time anything here runs, the state
//! transition is already durable. A push failure is logged and swallowed —
//! it must never undo or fail the transition that triggered it. Clients
//! that miss an event reconcile from the feed endpoints.

use serde::Serialize;

use crate::kernel::ServerDeps;

pub const EVENT_QUESTION_CREATED: &str = "questionCreated";
pub const EVENT_QUESTION_ANSWERED: &str = "questionAnswered";
pub const EVENT_QUESTION_HIDDEN: &str = "questionHidden";

/// Push an event to every subscriber of a session group.
pub async fn emit_to_session<T: Serialize>(
    deps: &ServerDeps,
    session_id: &str,
    event: &str,
    payload: &T,
) {
    let Some(value) = to_value(event, payload) else {
        return;
    };
    if let Err(e) = deps.broadcast.send_to_group(session_id, event, value).await {
        tracing::error!(error = %e, session_id, event, "Broadcast to session failed");
    }
}

/// Push an event to the author's personal channel, if they hold a
/// subscription bound to their token.
pub async fn emit_to_author<T: Serialize>(
    deps: &ServerDeps,
    author_token: &str,
    event: &str,
    payload: &T,
) {
    let Some(value) = to_value(event, payload) else {
        return;
    };
    if let Err(e) = deps
        .broadcast
        .send_to_user(author_token, event, value)
        .await
    {
        tracing::error!(error = %e, author_token, event, "Broadcast to author failed");
    }
}

fn to_value<T: Serialize>(event: &str, payload: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, event, "Failed to serialize fanout payload");
            None
        }
    }
}
