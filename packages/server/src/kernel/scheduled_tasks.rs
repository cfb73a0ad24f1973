//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Two periodic jobs:
//! - the answer worker tick, once per minute (the shortest interval the
//!   cron schedule supports reliably; a faster cadence would need a
//!   push-based trigger)
//! - rate limiter pruning, hourly
//!
//! Ticks may overlap with each other if one runs long; the worker's
//! conditional claim keeps overlap safe, so nothing here serializes them.

use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::questions::worker::run_answer_tick;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: Arc<ServerDeps>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Answer worker - runs every minute at :00 seconds
    let worker_deps = deps.clone();
    let answer_job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let deps = worker_deps.clone();
        Box::pin(async move {
            match run_answer_tick(&deps).await {
                Ok(outcome) => tracing::debug!(?outcome, "Answer tick finished"),
                // A failed tick ends here; the next tick retries naturally
                Err(e) => tracing::error!(error = %e, "Answer tick failed"),
            }
        })
    })?;
    scheduler.add(answer_job).await?;

    // Rate limiter housekeeping - hourly. Stale entries are dead weight,
    // not a correctness hazard.
    let prune_deps = deps.clone();
    let prune_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let deps = prune_deps.clone();
        Box::pin(async move {
            let pruned = deps.rate_limiter.prune();
            if pruned > 0 {
                tracing::debug!(pruned, "Pruned expired rate limiter entries");
            }
        })
    })?;
    scheduler.add(prune_job).await?;

    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (answer worker every minute, rate limiter pruning hourly)");
    Ok(scheduler)
}
