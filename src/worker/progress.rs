//! Periodic throughput reporting.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, info};

use super::SearchState;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One throughput sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    /// Candidates processed since the previous sample
    pub delta: u64,
    /// Counter value at sampling time
    pub total: u64,
    /// Wall-clock time covered by `delta`
    pub elapsed: Duration,
    /// Set on the flush emitted at shutdown
    pub is_final: bool,
}

/// Receives progress samples on the reporter thread.
pub trait ProgressSink: Send {
    fn emit(&mut self, sample: &ProgressSample);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressSample) + Send,
{
    fn emit(&mut self, sample: &ProgressSample) {
        self(sample)
    }
}

/// Writes samples to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&mut self, sample: &ProgressSample) {
        if sample.is_final {
            debug!(
                "Processed {} addresses since the last report ({} total)",
                sample.delta, sample.total
            );
        } else {
            info!(
                "Processed {} addresses in the last {:.1}s",
                sample.delta,
                sample.elapsed.as_secs_f64()
            );
        }
    }
}

/// Samples the shared counter on its own thread until finished.
pub struct ProgressReporter {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<u64>,
}

impl ProgressReporter {
    /// Spawns the reporter thread.
    ///
    /// The wait between samples is a receive with timeout on a shutdown
    /// channel, so [`finish`](Self::finish) wakes the thread immediately.
    pub fn spawn(
        state: Arc<SearchState>,
        interval: Duration,
        mut sink: Box<dyn ProgressSink>,
    ) -> io::Result<Self> {
        let interval = interval.max(MIN_INTERVAL);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("vanity-progress".into())
            .spawn(move || {
                let counter = state.clone();
                let mut last_count = 0u64;
                let mut last_tick = Instant::now();
                let mut sample = move |is_final: bool| {
                    let total = counter.processed();
                    let delta = total.saturating_sub(last_count);
                    sink.emit(&ProgressSample {
                        delta,
                        total,
                        elapsed: last_tick.elapsed(),
                        is_final,
                    });
                    last_count = total;
                    last_tick = Instant::now();
                    delta
                };

                let mut emitted = 0u64;
                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        // After the stop signal, increments are left for the final flush.
                        Err(RecvTimeoutError::Timeout) if state.is_stopped() => {}
                        Err(RecvTimeoutError::Timeout) => emitted += sample(false),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                emitted + sample(true)
            })?;

        Ok(Self {
            shutdown_tx,
            handle,
        })
    }

    /// Stops the reporter after a final flush and returns the sum of all emitted deltas.
    pub fn finish(self) -> u64 {
        drop(self.shutdown_tx);
        self.handle.join().unwrap_or(0)
    }
}
