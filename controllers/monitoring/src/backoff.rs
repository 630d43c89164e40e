//! # Retry backoff
//!
//! Fibonacci backoff for failed reconciles, tracked per Binding.
//! Sequence in minutes: 1, 1, 2, 3, 5, 8, 10 (max).
//!
//! Conflicts skip the sequence and retry after a short fixed delay, since
//! re-running the reconcile against a fresh read is all they need.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Delay before re-running a reconcile that hit a version conflict
pub const CONFLICT_REQUEUE: Duration = Duration::from_secs(5);

/// Fibonacci backoff calculator
///
/// Calculations are performed in minutes, then converted to seconds.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in minutes (for reset)
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Create a backoff starting at `min_minutes` and capped at `max_minutes`
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Get the next backoff duration in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result_seconds = self.current_minutes * 60;

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        result_seconds
    }

    /// Get the next backoff duration as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

/// Backoff state for one Binding
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffState {
    fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(1, 10), // 1 minute min, 10 minutes max
            error_count: 0,
        }
    }
}

/// Per-Binding backoff keyed by `namespace/name`
#[derive(Debug, Clone, Default)]
pub struct BackoffTracker {
    states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure and return how long to wait before the next attempt
    pub fn next_delay(&self, key: &str) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let state = states.entry(key.to_string()).or_insert_with(BackoffState::new);
        state.error_count += 1;
        state.backoff.next_backoff()
    }

    /// Consecutive failures recorded for `key`
    pub fn error_count(&self, key: &str) -> u32 {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(0, |state| state.error_count)
    }

    /// Forget the failures of `key` after a successful reconcile
    pub fn reset(&self, key: &str) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 10);

        // 1m, 1m, 2m, 3m, 5m, 8m, 10m (max)
        assert_eq!(backoff.next_backoff_seconds(), 60);
        assert_eq!(backoff.next_backoff_seconds(), 60);
        assert_eq!(backoff.next_backoff_seconds(), 120);
        assert_eq!(backoff.next_backoff_seconds(), 180);
        assert_eq!(backoff.next_backoff_seconds(), 300);
        assert_eq!(backoff.next_backoff_seconds(), 480);
        assert_eq!(backoff.next_backoff_seconds(), 600);
        // 13m would be next, capped at 10m
        assert_eq!(backoff.next_backoff_seconds(), 600);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();

        backoff.reset();

        assert_eq!(backoff.next_backoff(), Duration::from_secs(60));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(60));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(120));
    }

    #[test]
    fn test_tracker_keeps_bindings_apart() {
        let tracker = BackoffTracker::new();

        assert_eq!(tracker.next_delay("apps/orders"), Duration::from_secs(60));
        assert_eq!(tracker.next_delay("apps/orders"), Duration::from_secs(60));
        assert_eq!(tracker.next_delay("apps/orders"), Duration::from_secs(120));
        assert_eq!(tracker.next_delay("apps/billing"), Duration::from_secs(60));
        assert_eq!(tracker.error_count("apps/orders"), 3);
        assert_eq!(tracker.error_count("apps/billing"), 1);

        tracker.reset("apps/orders");
        assert_eq!(tracker.error_count("apps/orders"), 0);
        assert_eq!(tracker.next_delay("apps/orders"), Duration::from_secs(60));
    }
}
