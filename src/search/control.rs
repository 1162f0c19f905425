//! Cooperative cancellation and node accounting, shared between the UCI
//! front end (which sets the stop flag on `stop`/`quit`/a time budget) and
//! the search tree (which polls it between nodes rather than being
//! preempted).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A stop signal cheap to clone and share across the UCI command thread and
/// the search thread. Checked, never awaited: the search tree polls it at
/// node boundaries and unwinds with whatever score it has on hand.
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        StopSignal(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Node and optional hard node-limit tracking for a single `go` call.
pub struct NodeCounter {
    count: AtomicU64,
    limit: u64,
}

impl NodeCounter {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        NodeCounter {
            count: AtomicU64::new(0),
            limit,
        }
    }

    /// Records a node visit, returning `true` if the configured node limit
    /// (0 meaning unlimited) has just been reached.
    pub fn visit(&self) -> bool {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        self.limit > 0 && n >= self.limit
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_round_trips() {
        let stop = StopSignal::new();
        assert!(!stop.is_stopped());
        stop.request_stop();
        assert!(stop.is_stopped());
        stop.reset();
        assert!(!stop.is_stopped());
    }

    #[test]
    fn node_counter_trips_limit() {
        let nodes = NodeCounter::new(3);
        assert!(!nodes.visit());
        assert!(!nodes.visit());
        assert!(nodes.visit());
        assert_eq!(nodes.count(), 3);
    }

    #[test]
    fn zero_limit_never_trips() {
        let nodes = NodeCounter::new(0);
        for _ in 0..100 {
            assert!(!nodes.visit());
        }
    }
}
