//! # ton_vanity
//!
//! Multi-threaded TON vanity address generator: searches for a wallet whose
//! user-friendly address ends with a chosen suffix.
//!
//! ## Architecture
//!
//! - `crypto`: Mnemonic generation and wallet address derivation
//! - `matcher`: Suffix matching
//! - `worker`: Parallel search, termination and progress reporting
//! - `output`: Result display and persistence
//! - `daemon`: Background-process lifecycle (unix only)
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
#[cfg(unix)]
pub mod daemon;
pub mod matcher;
pub mod output;
pub mod worker;

pub use config::{Config, SearchConfig};
pub use crypto::{AddressDeriver, Mnemonic, TonDeriver, WalletParams};
pub use matcher::SuffixPattern;
pub use output::ResultSink;
pub use worker::{MatchResult, SearchOutcome, WorkerPool};
