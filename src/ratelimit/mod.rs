//! Fixed-window request admission keyed by hashed client signature.


use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded; retry after {}s", .retry_after.as_secs().max(1))]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}

impl RateLimitExceeded {
    /// Whole seconds for the `Retry-After` header (never zero).
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs.max(1)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<u64, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_max_requests, config.rate_limit_window)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits one request for `signature` now.
    pub fn check(&self, signature: u64) -> Result<(), RateLimitExceeded> {
        self.check_at(signature, Instant::now())
    }

    /// Admits one request for `signature` at `now`.
    pub fn check_at(&self, signature: u64, now: Instant) -> Result<(), RateLimitExceeded> {
        let window = self.window;
        let mut windows = self.windows.lock();

        windows.retain(|_, w| now.saturating_duration_since(w.started) < window);

        let entry = windows.entry(signature).or_insert(Window {
            started: now,
            count: 0,
        });

        if entry.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(entry.started);
            let retry_after = window.saturating_sub(elapsed);
            debug!(signature, retry_after_ms = retry_after.as_millis() as u64, "Rate limited");
            return Err(RateLimitExceeded { retry_after });
        }

        entry.count += 1;
        Ok(())
    }

    /// Number of clients with a live window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }
}
