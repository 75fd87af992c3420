//! Sliding-window rate limiting keyed by identifier and action.
//!
//! The default implementation is an in-process map guarded by a mutex. State
//! is process-local and non-durable: it provides no guarantee across multiple
//! server instances. Multi-instance deployments should inject a shared
//! counter store behind the same trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

// ---

/// Decides whether an attempt keyed by `(identifier, action)` may proceed.
pub trait RateLimiter: Send + Sync {
    // ---
    /// Returns `true` and records the attempt when under the limit; returns
    /// `false` without recording when the limit is reached (fail closed).
    fn check_and_record(&self, identifier: &str, action: &str) -> bool;
}

/// Type alias for any backend that implements RateLimiter.
pub type RateLimiterPtr = Arc<dyn RateLimiter>;

// ---

/// In-process sliding-window limiter.
///
/// Keys with no remaining in-window attempts are dropped opportunistically on
/// each check; there is no background sweeper.
pub struct SlidingWindowLimiter {
    // ---
    window: Duration,
    max_attempts: usize,
    attempts: Mutex<HashMap<(String, String), Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    // ---
    pub fn new(window: Duration, max_attempts: usize) -> Self {
        // ---
        Self {
            window,
            max_attempts,
            attempts: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for SlidingWindowLimiter {
    // ---
    fn check_and_record(&self, identifier: &str, action: &str) -> bool {
        // ---
        let now = Instant::now();
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Prune expired timestamps everywhere and drop empty keys.
        attempts.retain(|_, stamps| {
            stamps.retain(|t| now.duration_since(*t) < self.window);
            !stamps.is_empty()
        });

        let stamps = attempts
            .entry((identifier.to_string(), action.to_string()))
            .or_default();

        if stamps.len() >= self.max_attempts {
            // Rejected attempts are not recorded.
            return false;
        }

        stamps.push(now);
        true
    }
}
