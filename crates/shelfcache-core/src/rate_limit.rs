//! Sliding-window request limiting behind an injectable store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Keys tracked before a full sweep of idle keys runs.
const SWEEP_THRESHOLD: usize = 1_024;

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Counts requests per key. In-process for a single instance; an external
/// store can implement the same contract for multi-instance deployments.
pub trait RateLimitStore: Send + Sync {
    fn check(&self, key: &str, now: Instant) -> RateDecision;
}

/// Allows at most `limit` requests per key within any `window`.
///
/// Each check discards the key's timestamps older than the window before
/// counting.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.entries
            .lock()
            .expect("rate limit lock is not poisoned")
            .len()
    }

    /// Drop every key with no request inside the window.
    pub fn sweep(&self, now: Instant) {
        let mut entries = self.entries.lock().expect("rate limit lock is not poisoned");
        let window = self.window;
        entries.retain(|_, hits| {
            discard_expired(hits, now, window);
            !hits.is_empty()
        });
    }
}

impl RateLimitStore for SlidingWindowLimiter {
    fn check(&self, key: &str, now: Instant) -> RateDecision {
        let mut entries = self.entries.lock().expect("rate limit lock is not poisoned");

        if entries.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            entries.retain(|_, hits| {
                discard_expired(hits, now, window);
                !hits.is_empty()
            });
        }

        let hits = entries.entry(key.to_owned()).or_default();
        discard_expired(hits, now, self.window);

        if hits.len() >= self.limit as usize {
            let retry_after = hits
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            return RateDecision::Limited { retry_after };
        }

        hits.push_back(now);
        RateDecision::Allowed {
            remaining: self.limit.saturating_sub(hits.len() as u32),
        }
    }
}

fn discard_expired(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = hits.front() {
        if now.saturating_duration_since(*oldest) >= window {
            hits.pop_front();
        } else {
            break;
        }
    }
}
