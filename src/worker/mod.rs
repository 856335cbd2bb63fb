//! Worker pool for the parallel suffix search.
//!
//! This module provides:
//! - The per-thread search loop
//! - Shared counter and one-way termination signal
//! - The coordinator that spawns workers and collects the winner
//! - Periodic progress reporting

mod cpu;
mod pool;
mod progress;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use cpu::CpuWorker;
pub use pool::{MatchResult, SearchError, SearchOutcome, WorkerPool, DEFAULT_REPORT_INTERVAL};
pub use progress::{LogSink, ProgressReporter, ProgressSample, ProgressSink};
pub use state::SearchState;
