//! State shared by the workers and the progress reporter for one search run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Processed counter plus the one-way termination signal.
///
/// The counter only grows. The signal moves from running to stopped once and
/// is never reset.
#[derive(Debug, Default)]
pub struct SearchState {
    processed: AtomicU64,
    stopped: AtomicBool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the termination signal.
    ///
    /// Returns true for exactly one caller per run: the one whose
    /// compare-and-swap moved the signal from running to stopped.
    #[inline]
    pub fn try_stop(&self) -> bool {
        self.stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Raises the termination signal, ignoring whether this call won.
    pub fn stop(&self) {
        let _ = self.try_stop();
    }

    /// Returns true once the termination signal has been raised.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Counts one processed, non-matching candidate.
    #[inline]
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of processed candidates so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_stop_is_one_way() {
        let state = SearchState::new();
        assert!(!state.is_stopped());
        assert!(state.try_stop());
        assert!(state.is_stopped());
        assert!(!state.try_stop());
        state.stop();
        assert!(state.is_stopped());
    }

    #[test]
    fn test_exactly_one_concurrent_winner() {
        const THREADS: usize = 16;

        for _ in 0..50 {
            let state = Arc::new(SearchState::new());
            let barrier = Arc::new(Barrier::new(THREADS));

            let winners: usize = (0..THREADS)
                .map(|_| {
                    let state = state.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        state.try_stop()
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum();

            assert_eq!(winners, 1);
        }
    }

    #[test]
    fn test_no_lost_increments() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 10_000;

        let state = Arc::new(SearchState::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        state.record_processed();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.processed(), THREADS * PER_THREAD);
    }
}
