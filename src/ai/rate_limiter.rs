//! Rolling-window rate limiting for generation calls
//!
//! Two independent sliding windows: request timestamps and token samples.
//! Back-pressure is always resolved by waiting until the oldest entry leaves
//! the window, never by rejecting. The window lock is held across the wait so
//! each admission prunes, checks and records as one step.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;

#[derive(Debug, Default)]
struct Windows {
    requests: VecDeque<Instant>,
    tokens: VecDeque<(Instant, u64)>,
}

impl Windows {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(t) = self.requests.front() {
            if now.duration_since(*t) >= window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
        while let Some((t, _)) = self.tokens.front() {
            if now.duration_since(*t) >= window {
                self.tokens.pop_front();
            } else {
                break;
            }
        }
    }

    fn tokens_in_window(&self) -> u64 {
        self.tokens.iter().map(|(_, n)| n).sum()
    }
}

/// Snapshot of current window usage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub requests_in_window: usize,
    pub requests_remaining: usize,
    pub tokens_in_window: u64,
    pub tokens_remaining: u64,
    pub is_limited: bool,
}

/// Sliding window limiter shared by all calls from one client
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Duration,
    state: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms.max(1)),
            config,
            state: Mutex::new(Windows::default()),
        }
    }

    /// Wait for a free request slot, then record this request
    pub async fn check_limit(&self) {
        let max_requests = self.config.requests_per_minute.max(1) as usize;
        let mut state = self.state.lock().await;

        loop {
            let now = Instant::now();
            state.prune(now, self.window);
            if state.requests.len() < max_requests {
                break;
            }
            let Some(oldest) = state.requests.front().copied() else {
                break;
            };
            let wait = (oldest + self.window).saturating_duration_since(now);
            warn!(
                requests = state.requests.len(),
                max = max_requests,
                wait_ms = wait.as_millis() as u64,
                "[RateLimiter] Request limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }

        state.requests.push_back(Instant::now());
    }

    /// Wait until `estimated_tokens` fits the token budget, then record it.
    /// A single request larger than the whole budget is admitted once the
    /// window is empty.
    pub async fn check_token_limit(&self, estimated_tokens: u64) {
        let max_tokens = self.config.tokens_per_minute;
        let mut state = self.state.lock().await;

        loop {
            let now = Instant::now();
            state.prune(now, self.window);
            let used = state.tokens_in_window();
            if used + estimated_tokens <= max_tokens {
                break;
            }
            let Some((oldest, _)) = state.tokens.front().copied() else {
                break;
            };
            let wait = (oldest + self.window).saturating_duration_since(now);
            warn!(
                used,
                requested = estimated_tokens,
                max = max_tokens,
                wait_ms = wait.as_millis() as u64,
                "[RateLimiter] Token limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }

        debug!(tokens = estimated_tokens, "[RateLimiter] Tokens admitted");
        state.tokens.push_back((Instant::now(), estimated_tokens));
    }

    pub async fn status(&self) -> RateLimitStatus {
        let mut state = self.state.lock().await;
        state.prune(Instant::now(), self.window);

        let requests = state.requests.len();
        let tokens = state.tokens_in_window();
        let max_requests = self.config.requests_per_minute as usize;
        RateLimitStatus {
            requests_in_window: requests,
            requests_remaining: max_requests.saturating_sub(requests),
            tokens_in_window: tokens,
            tokens_remaining: self.config.tokens_per_minute.saturating_sub(tokens),
            is_limited: requests >= max_requests || tokens >= self.config.tokens_per_minute,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Rough token estimate: one token per four characters, rounded up
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(requests_per_minute: u32, tokens_per_minute: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_minute,
            tokens_per_minute,
            window_ms: 60_000,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_waits_for_window() {
        let limiter = limiter(1, 40_000);
        let start = Instant::now();

        limiter.check_limit().await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.check_limit().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(60), "waited {:?}", waited);
        assert!(waited < Duration::from_secs(61), "waited {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_allows_under_limit_without_waiting() {
        let limiter = limiter(3, 40_000);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.check_limit().await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));
        let status = limiter.status().await;
        assert_eq!(status.requests_in_window, 3);
        assert_eq!(status.requests_remaining, 0);
        assert!(status.is_limited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_exceed_cap() {
        let limiter = Arc::new(limiter(2, 1_000_000));
        let start = Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.check_limit().await;
                    Instant::now()
                })
            })
            .collect();
        let mut admitted: Vec<Instant> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        admitted.sort();

        // Any 60s window holds at most two admissions
        for (i, t) in admitted.iter().enumerate() {
            let in_window = admitted[i..]
                .iter()
                .filter(|u| u.duration_since(*t) < Duration::from_secs(60))
                .count();
            assert!(in_window <= 2, "window starting at {:?} admitted {}", t.duration_since(start), in_window);
        }
        assert!(admitted[4].duration_since(start) >= Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_budget_waits() {
        let limiter = limiter(100, 1_000);
        let start = Instant::now();

        limiter.check_token_limit(800).await;
        limiter.check_token_limit(100).await;
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.check_token_limit(500).await;
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(limiter.status().await.tokens_in_window, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_request_admitted_on_empty_window() {
        let limiter = limiter(100, 100);
        let start = Instant::now();
        limiter.check_token_limit(5_000).await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
