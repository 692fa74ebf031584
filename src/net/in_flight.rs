//! In-flight request tracking for graceful shutdown.
//!
//! # Responsibilities
//! - Count handlers that are currently executing
//! - Hand out a guard per request that decrements on drop (panics included)
//! - Let the lifecycle controller wait until the count reaches zero

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Global atomic counter for request sequence numbers.
/// Relaxed ordering is enough since we only need uniqueness.
static REQUEST_SEQ_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique sequence number of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub fn next() -> Self {
        Self(REQUEST_SEQ_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Tracks executing handlers.
///
/// The count lives in a watch channel so waiters are woken on every change
/// instead of polling.
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    count: Arc<watch::Sender<usize>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0usize);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Record a handler entry. The returned guard records the exit.
    pub fn track(&self) -> InFlightGuard {
        self.count.send_modify(|n| *n += 1);
        let seq = RequestSeq::next();
        tracing::trace!(request_seq = %seq, "Request started");
        InFlightGuard {
            count: Arc::clone(&self.count),
            seq,
        }
    }

    /// Number of handlers currently executing.
    pub fn active_count(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolve once no handler is executing. No deadline.
    pub async fn drained(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the lifetime of one request.
#[derive(Debug)]
pub struct InFlightGuard {
    count: Arc<watch::Sender<usize>>,
    seq: RequestSeq,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
        tracing::trace!(request_seq = %self.seq, "Request finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn request_seq_unique() {
        let a = RequestSeq::next();
        let b = RequestSeq::next();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }

    #[test]
    fn tracker_counts() {
        let tracker = InFlightTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        assert_eq!(tracker.active_count(), 1);

        let guard2 = tracker.clone().track();
        assert_eq!(tracker.active_count(), 2);

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn drained_resolves_immediately_when_idle() {
        let tracker = InFlightTracker::new();
        tokio::time::timeout(Duration::from_millis(100), tracker.drained())
            .await
            .expect("idle tracker should already be drained");
    }

    #[tokio::test]
    async fn drained_waits_for_last_guard() {
        let tracker = InFlightTracker::new();
        let guard = tracker.track();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.drained().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("drained should resolve after the guard drops")
            .unwrap();
    }
}
