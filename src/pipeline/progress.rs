//! Shared progress and cancellation state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Completed-asset count for the current run.
///
/// Clones share the same counter, so a UI thread can poll it while the
/// pipeline runs. Only the pipeline's aggregator increments it, once per
/// finished asset; it is reset when a new run starts.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    inner: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> usize {
        self.inner.completed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.inner.total.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.completed() >= self.total()
    }

    pub(crate) fn reset(&self, total: usize) {
        self.inner.completed.store(0, Ordering::Release);
        self.inner.total.store(total, Ordering::Release);
    }

    /// Record one finished asset; returns the new count.
    pub(crate) fn tick(&self) -> usize {
        self.inner.completed.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Cooperative cancellation for a run.
///
/// Assets that have not started when the token is cancelled are recorded
/// as cancelled failures; assets already in the encoder run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_counter_shared_between_clones() {
        let counter = ProgressCounter::new();
        let view = counter.clone();

        counter.reset(3);
        counter.tick();
        counter.tick();

        assert_eq!(view.completed(), 2);
        assert_eq!(view.total(), 3);
        assert!(!view.is_complete());
    }

    #[test]
    fn test_concurrent_ticks_are_not_lost() {
        let counter = ProgressCounter::new();
        counter.reset(8 * 1000);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.tick();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.completed(), 8000);
        assert!(counter.is_complete());
    }

    #[test]
    fn test_reset() {
        let counter = ProgressCounter::new();
        counter.reset(1);
        counter.tick();
        counter.reset(5);

        assert_eq!(counter.completed(), 0);
        assert_eq!(counter.total(), 5);
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let other = token.clone();

        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
