use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Sliding-window limits shared by forecast and search calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window_ms: 60_000 }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Client-side sliding-window rate limiter.
///
/// Remembers the instants of approved calls; a new call is approved only if
/// fewer than `max_requests` approvals fall inside the trailing window.
/// One instance is shared by every caller in a session.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    approvals: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self { max_requests, window, approvals: Mutex::new(VecDeque::new()) }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn can_make_request(&self) -> bool {
        self.can_make_request_at(Instant::now())
    }

    /// Approve or deny a call made at `now`, recording it on approval.
    pub fn can_make_request_at(&self, now: Instant) -> bool {
        let mut approvals = self.approvals.lock();

        // Oldest first, so expired entries are always at the front.
        while let Some(&oldest) = approvals.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            approvals.pop_front();
        }

        if approvals.len() >= self.max_requests {
            return false;
        }

        approvals.push_back(now);
        true
    }

    /// Approvals still inside the window at `now`.
    pub fn approvals_in_window_at(&self, now: Instant) -> usize {
        self.approvals
            .lock()
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < self.window)
            .count()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
