//! Scripted derivers for exercising the worker loop and pool.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::crypto::{AddressDeriver, DerivationError, WalletParams};

use super::SearchState;

pub const MATCHING: &str = "UQDtestaddress000000000000000000000000000000-XAB";
pub const NON_MATCHING: &str = "UQDtestaddress000000000000000000000000000000-Xab";

pub fn config(workers: usize) -> SearchConfig {
    SearchConfig {
        wallet: WalletParams::default(),
        suffix: "AB".into(),
        case_sensitive: true,
        workers,
    }
}

/// Seeds are consecutive integers. Seed `n` matches when `n % match_every == match_every - 1`
/// and fails to derive when `fail_even` is set and `n` is even.
pub struct ScriptedDeriver {
    next_seed: AtomicU64,
    match_every: u64,
    fail_even: bool,
    pub failures: AtomicU64,
    pub non_matching: AtomicU64,
}

impl ScriptedDeriver {
    pub fn new(match_every: u64, fail_even: bool) -> Self {
        Self {
            next_seed: AtomicU64::new(0),
            match_every,
            fail_even,
            failures: AtomicU64::new(0),
            non_matching: AtomicU64::new(0),
        }
    }
}

impl AddressDeriver for ScriptedDeriver {
    type Seed = u64;

    fn generate_seed(&self) -> u64 {
        self.next_seed.fetch_add(1, Ordering::Relaxed)
    }

    fn derive(&self, seed: &u64, _params: &WalletParams) -> Result<String, DerivationError> {
        if self.fail_even && seed % 2 == 0 {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(DerivationError::Key(format!("injected failure for seed {}", seed)));
        }
        if seed % self.match_every == self.match_every - 1 {
            Ok(MATCHING.to_string())
        } else {
            self.non_matching.fetch_add(1, Ordering::Relaxed);
            Ok(NON_MATCHING.to_string())
        }
    }
}

impl AddressDeriver for Arc<ScriptedDeriver> {
    type Seed = u64;

    fn generate_seed(&self) -> u64 {
        self.as_ref().generate_seed()
    }

    fn derive(&self, seed: &u64, params: &WalletParams) -> Result<String, DerivationError> {
        self.as_ref().derive(seed, params)
    }
}

/// Every candidate matches; the first derivation of each worker waits on a
/// barrier so that all workers report at the same instant.
pub struct RacingDeriver {
    barrier: Barrier,
}

impl RacingDeriver {
    pub fn new(workers: usize) -> Self {
        Self {
            barrier: Barrier::new(workers),
        }
    }
}

impl AddressDeriver for RacingDeriver {
    type Seed = u64;

    fn generate_seed(&self) -> u64 {
        self.barrier.wait();
        0
    }

    fn derive(&self, _seed: &u64, _params: &WalletParams) -> Result<String, DerivationError> {
        Ok(MATCHING.to_string())
    }
}

/// Never matches. Allows exactly `budget` successful derivations in total,
/// then fails every call and raises the termination signal.
pub struct BudgetDeriver {
    budget: AtomicI64,
    state: Arc<SearchState>,
    pause: Duration,
}

impl BudgetDeriver {
    pub fn new(budget: i64, state: Arc<SearchState>, pause: Duration) -> Self {
        Self {
            budget: AtomicI64::new(budget),
            state,
            pause,
        }
    }
}

impl AddressDeriver for BudgetDeriver {
    type Seed = u64;

    fn generate_seed(&self) -> u64 {
        0
    }

    fn derive(&self, _seed: &u64, _params: &WalletParams) -> Result<String, DerivationError> {
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        if self.budget.fetch_sub(1, Ordering::Relaxed) > 0 {
            Ok(NON_MATCHING.to_string())
        } else {
            self.state.stop();
            Err(DerivationError::Key("budget exhausted".into()))
        }
    }
}
