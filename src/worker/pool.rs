//! Worker pool management: spawns the search threads and collects the winner.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Sender};
use log::{error, info};

use crate::config::SearchConfig;
use crate::crypto::AddressDeriver;

use super::cpu::CpuWorker;
use super::progress::{LogSink, ProgressReporter, ProgressSink};
use super::SearchState;

/// Default interval between progress samples.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// The winning candidate of a search run.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The credential phrase
    pub seed_phrase: String,
    /// The derived user-friendly address
    pub address: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
    /// When the match was found
    pub found_at: DateTime<Local>,
}

/// What a completed run reports back.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The winner, or `None` if the run was stopped from outside first
    pub result: Option<MatchResult>,
    /// Non-matching candidates processed across all workers
    pub processed: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Returns the average processing rate (candidates per second).
    pub fn per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.processed as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: String,
        #[source]
        source: io::Error,
    },
}

/// Coordinates one search run over a pool of CPU workers.
pub struct WorkerPool<D: AddressDeriver + 'static> {
    /// Immutable search parameters
    config: Arc<SearchConfig>,
    /// Shared credential source and deriver
    deriver: Arc<D>,
    /// Shared counter and termination signal
    state: Arc<SearchState>,
    /// Interval between progress samples
    report_interval: Duration,
    /// Destination of progress samples
    progress_sink: Box<dyn ProgressSink>,
}

impl<D: AddressDeriver + 'static> WorkerPool<D> {
    /// Creates a pool with fresh search state.
    pub fn new(config: SearchConfig, deriver: D) -> Self {
        Self::with_state(config, deriver, Arc::new(SearchState::new()))
    }

    /// Creates a pool around existing search state.
    pub fn with_state(config: SearchConfig, deriver: D, state: Arc<SearchState>) -> Self {
        Self {
            config: Arc::new(config),
            deriver: Arc::new(deriver),
            state,
            report_interval: DEFAULT_REPORT_INTERVAL,
            progress_sink: Box::new(LogSink),
        }
    }

    /// Sets the interval between progress samples.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Replaces the log-backed progress sink.
    pub fn with_progress_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress_sink = Box::new(sink);
        self
    }

    /// Returns the number of workers the run will start.
    pub fn num_workers(&self) -> usize {
        self.config.workers.max(1)
    }

    /// Returns the shared state, e.g. for signal handlers.
    pub fn state(&self) -> Arc<SearchState> {
        self.state.clone()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.state.stop();
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    /// Runs the search to completion.
    ///
    /// Blocks until every worker has exited, either because one of them won
    /// or because the termination signal was raised from outside.
    pub fn run(self) -> Result<SearchOutcome, SearchError> {
        let start = Instant::now();
        let num_workers = self.num_workers();
        let (result_tx, result_rx) = bounded(1);

        info!("Using {} threads", num_workers);

        let reporter =
            ProgressReporter::spawn(self.state.clone(), self.report_interval, self.progress_sink)
                .map_err(|source| SearchError::Spawn {
                    thread: "progress".into(),
                    source,
                })?;

        let mut handles = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            match Self::spawn_worker(
                id,
                self.config.clone(),
                self.deriver.clone(),
                result_tx.clone(),
                self.state.clone(),
            ) {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    self.state.stop();
                    Self::join_workers(handles);
                    reporter.finish();
                    return Err(SearchError::Spawn {
                        thread: format!("worker {}", id),
                        source,
                    });
                }
            }
        }
        drop(result_tx);

        Self::join_workers(handles);
        reporter.finish();

        let mut results = result_rx.try_iter();
        let result = results.next();
        let extra = results.count();
        if extra > 0 {
            error!("{} surplus match results discarded", extra);
        }

        Ok(SearchOutcome {
            result,
            processed: self.state.processed(),
            elapsed: start.elapsed(),
        })
    }

    fn spawn_worker(
        id: usize,
        config: Arc<SearchConfig>,
        deriver: Arc<D>,
        result_tx: Sender<MatchResult>,
        state: Arc<SearchState>,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("vanity-worker-{}", id))
            .spawn(move || {
                let worker = CpuWorker::new(id, config, deriver, result_tx, state);
                worker.run();
            })
    }

    fn join_workers(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}
