//! # Fibonacci Backoff
//!
//! Progressive retry delays for failed reconciliations. The sequence grows
//! more slowly than exponential backoff, which suits cloud APIs that are
//! eventually consistent: a resource that failed because its dependency is
//! still provisioning usually succeeds a few passes later.
//!
//! Sequence with a 5s floor and 300s ceiling: 5s, 5s, 10s, 15s, 25s, 40s,
//! 65s, 105s, 170s, 275s, 300s (max).
//!
//! ## Usage
//!
//! ```rust
//! use alibaba_provider::controller::backoff::FibonacciBackoff;
//!
//! let mut backoff = FibonacciBackoff::new(5, 300);
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 10);
//! assert_eq!(backoff.next_backoff_seconds(), 15);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at the maximum.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in seconds (for reset)
    min_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with minimum and maximum values in seconds
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Get the next backoff in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;
        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = std::cmp::min(next, self.max_secs);
        result
    }

    /// Get the next backoff as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}

/// Backoff state for one managed resource
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Backoff states of one controller, keyed by object name
///
/// An entry exists only while its resource keeps failing; it is dropped on
/// the next successful pass and when the resource is released.
#[derive(Debug)]
pub struct BackoffTable {
    min_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<String, BackoffState>>,
}

impl BackoffTable {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            max_secs,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Count a failure of `name`; returns the delay in seconds and the error count
    ///
    /// `None` when the table lock is poisoned.
    pub fn record_error(&self, name: &str) -> Option<(u64, u32)> {
        let mut states = self.states.lock().ok()?;
        let state = states
            .entry(name.to_string())
            .or_insert_with(|| BackoffState::new(self.min_secs, self.max_secs));
        state.increment_error();
        Some((state.backoff.next_backoff_seconds(), state.error_count))
    }

    pub fn forget(&self, name: &str) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(name);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.lock().map_or(0, |s| s.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        let seq: Vec<u64> = (0..12).map(|_| backoff.next_backoff_seconds()).collect();
        assert_eq!(seq, vec![5, 5, 10, 15, 25, 40, 65, 105, 170, 275, 300, 300]);
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(5, 300);
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();
        backoff.next_backoff_seconds();

        backoff.reset();

        assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(5));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_table_is_per_resource() {
        let table = BackoffTable::new(1, 60);
        let delays: Vec<u64> = (0..4)
            .filter_map(|_| table.record_error("orders-db"))
            .map(|(secs, _)| secs)
            .collect();
        assert_eq!(delays, vec![1, 1, 2, 3]);
        assert_eq!(table.record_error("web"), Some((1, 1)));
        assert_eq!(table.record_error("orders-db"), Some((5, 5)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_backoff_table_forgets_released_resources() {
        let table = BackoffTable::new(1, 60);
        table.record_error("orders-db");
        table.record_error("orders-db");
        table.forget("orders-db");
        table.forget("never-failed");
        assert!(table.is_empty());
        assert_eq!(table.record_error("orders-db"), Some((1, 1)));
    }
}
