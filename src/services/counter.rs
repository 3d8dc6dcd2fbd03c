//! Process-wide named-counter store used for operational metrics.
//!
//! Counters are created implicitly on first increment, never deleted during
//! the process lifetime, and reset only by restart. The whole increment
//! happens under one write lock, so two concurrent first increments of the
//! same key always sum instead of clobbering each other.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory aggregator of named monotonically-increasing counters.
#[derive(Debug, Default)]
pub struct CounterService {
    counters: RwLock<HashMap<String, u64>>,
}

impl CounterService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the counter named `key`, creating it if absent, and
    /// return the new total. A zero delta is a no-op returning 0.
    pub fn increment(&self, key: &str, delta: u64) -> u64 {
        if delta == 0 {
            return 0;
        }
        let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += delta;
        *value
    }

    /// Current value of the counter, or `None` if it was never incremented.
    pub fn get(&self, key: &str) -> Option<u64> {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        counters.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key() {
        let counters = CounterService::new();
        assert_eq!(counters.get("never_touched"), None);
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        let counters = CounterService::new();
        assert_eq!(counters.increment("requests", 0), 0);
        assert_eq!(counters.get("requests"), None);

        counters.increment("requests", 5);
        assert_eq!(counters.increment("requests", 0), 0);
        assert_eq!(counters.get("requests"), Some(5));
    }

    #[test]
    fn test_accumulation() {
        let counters = CounterService::new();
        assert_eq!(counters.increment("requests", 3), 3);
        assert_eq!(counters.increment("requests", 4), 7);
        assert_eq!(counters.get("requests"), Some(7));
    }

    #[test]
    fn test_independent_keys() {
        let counters = CounterService::new();
        counters.increment("a", 1);
        counters.increment("b", 2);
        assert_eq!(counters.get("a"), Some(1));
        assert_eq!(counters.get("b"), Some(2));
    }

    #[test]
    fn test_concurrent_first_increments_sum() {
        use std::sync::Arc;

        let counters = Arc::new(CounterService::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let counters = counters.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        counters.increment("contended", 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counters.get("contended"), Some(1600));
    }
}
