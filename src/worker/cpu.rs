//! CPU worker: the per-thread search loop.

use std::sync::Arc;

use chrono::Local;
use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::config::SearchConfig;
use crate::crypto::AddressDeriver;
use crate::matcher::SuffixPattern;

use super::{MatchResult, SearchState};

/// A CPU worker that generates candidates and tests them against the suffix.
pub struct CpuWorker<D: AddressDeriver> {
    /// Worker ID
    id: usize,
    /// Immutable search parameters
    config: Arc<SearchConfig>,
    /// Compiled suffix pattern
    pattern: SuffixPattern,
    /// Credential source and address derivation
    deriver: Arc<D>,
    /// Channel for the winning result
    result_tx: Sender<MatchResult>,
    /// Shared counter and termination signal
    state: Arc<SearchState>,
}

impl<D: AddressDeriver> CpuWorker<D> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        config: Arc<SearchConfig>,
        deriver: Arc<D>,
        result_tx: Sender<MatchResult>,
        state: Arc<SearchState>,
    ) -> Self {
        let pattern = config.pattern();
        Self {
            id,
            config,
            pattern,
            deriver,
            result_tx,
            state,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates candidates until:
    /// - A match is found (raises the termination signal, sends the result if this worker won)
    /// - The termination signal is raised by a peer or from outside
    pub fn run(&self) {
        debug!("worker {} started", self.id);

        while !self.state.is_stopped() {
            let seed = self.deriver.generate_seed();

            let address = match self.deriver.derive(&seed, &self.config.wallet) {
                Ok(address) => address,
                Err(e) => {
                    warn!("Failed to create wallet: {}", e);
                    continue;
                }
            };

            if self.pattern.matches(&address) {
                if self.state.try_stop() {
                    let result = MatchResult {
                        seed_phrase: seed.to_string(),
                        address,
                        worker_id: self.id,
                        found_at: Local::now(),
                    };
                    // The receiver outlives every worker; a failed send means the pool is gone.
                    let _ = self.result_tx.send(result);
                }
                break;
            }

            self.state.record_processed();
        }

        debug!("worker {} exited", self.id);
    }
}
