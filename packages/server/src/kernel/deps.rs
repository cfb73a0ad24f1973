//! Server dependencies (using traits for testability)
//!
//! Central dependency container handed to the engine, the worker, and the
//! HTTP handlers. All external services sit behind trait objects so tests
//! can inject the mocks from `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use signalr::SignalRService;

use crate::domains::questions::rate_limit::RateLimiter;
use crate::kernel::{BaseAI, BaseBroadcast, BaseModeration, BaseQuestionStore};

// =============================================================================
// SignalRService Adapter (implements BaseBroadcast trait)
// =============================================================================

/// Wrapper around SignalRService that implements the BaseBroadcast trait
pub struct SignalRAdapter(pub Arc<SignalRService>);

impl SignalRAdapter {
    pub fn new(service: Arc<SignalRService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseBroadcast for SignalRAdapter {
    async fn send_to_group(
        &self,
        group: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.0
            .send_to_group(group, target, payload)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn send_to_user(
        &self,
        user_id: &str,
        target: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.0
            .send_to_user(user_id, target, payload)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to the engine and worker
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseQuestionStore>,
    pub ai: Arc<dyn BaseAI>,
    pub moderation: Arc<dyn BaseModeration>,
    pub broadcast: Arc<dyn BaseBroadcast>,
    /// Per-author submission throttle. Constructed once per process; a
    /// distributed deployment would swap the in-memory map for a shared
    /// store behind the same component.
    pub rate_limiter: Arc<RateLimiter>,
    /// Upper bound on one answer-generation call.
    pub completion_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseQuestionStore>,
        ai: Arc<dyn BaseAI>,
        moderation: Arc<dyn BaseModeration>,
        broadcast: Arc<dyn BaseBroadcast>,
        rate_limiter: Arc<RateLimiter>,
        completion_timeout: Duration,
    ) -> Self {
        Self {
            store,
            ai,
            moderation,
            broadcast,
            rate_limiter,
            completion_timeout,
        }
    }
}
