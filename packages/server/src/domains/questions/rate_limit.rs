//! Per-author submission throttling.
//!
//! In-memory, per-process limiter keyed by the opaque author token. This is
//! UX throttling, not a hard quota: multiple server instances each hold
//! their own window, which is acceptable. A distributed deployment would
//! swap the map for a shared counter store behind the same interface.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum interval between accepted submissions per author.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(20);

pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true and opens a new window if the author is outside their
    /// cooldown. A rejected attempt leaves the window untouched, so callers
    /// cannot push their own cooldown forward by hammering.
    pub fn allow(&self, author_token: &str) -> bool {
        self.allow_at(author_token, Instant::now())
    }

    fn allow_at(&self, author_token: &str, now: Instant) -> bool {
        let mut map = self
            .last_accepted
            .lock()
            .expect("rate limiter lock poisoned");

        if let Some(last) = map.get(author_token) {
            if now.duration_since(*last) < self.cooldown {
                return false;
            }
        }

        map.insert(author_token.to_string(), now);
        true
    }

    /// Drop entries whose window has already elapsed. Stale entries are
    /// dead weight, not a correctness hazard. Returns the count removed.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let mut map = self
            .last_accepted
            .lock()
            .expect("rate limiter lock poisoned");
        let before = map.len();
        map.retain(|_, last| now.duration_since(*last) < self.cooldown);
        before - map.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
