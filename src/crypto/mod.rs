//! Credential generation and TON wallet address derivation.
//!
//! This module provides:
//! - The [`AddressDeriver`] seam consumed by the search workers
//! - TON mnemonic generation and ed25519 key derivation
//! - Cell hashing, wallet state-init construction and user-friendly address encoding

mod address;
mod cell;
mod mnemonic;
mod wallet;

use std::fmt;

pub use address::{TonAddress, FRIENDLY_LEN};
pub use cell::{Cell, CellBuilder, CellError, CellRef};
pub use mnemonic::{Mnemonic, WORD_COUNT};
pub use wallet::{Network, TonDeriver, WalletParams, WalletVersion, DEFAULT_WORKCHAIN};

/// Produces fresh credentials and derives their public address text.
///
/// Implementations must draw independent entropy on every `generate_seed` call;
/// workers call it concurrently from many threads.
pub trait AddressDeriver: Send + Sync {
    /// The credential type. Its `Display` form is the phrase shown to the user.
    type Seed: fmt::Display + Send;

    /// Generates a new random credential.
    fn generate_seed(&self) -> Self::Seed;

    /// Derives the textual address for `seed` under `params`.
    fn derive(&self, seed: &Self::Seed, params: &WalletParams) -> Result<String, DerivationError>;
}

/// A single candidate failed to produce an address.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    #[error("unknown mnemonic word: {0}")]
    UnknownWord(String),
    #[error("expected {expected} mnemonic words, got {actual}")]
    WordCount { expected: usize, actual: usize },
    #[error("mnemonic does not pass the TON seed check")]
    NotBasicSeed,
    #[error("key derivation failed: {0}")]
    Key(String),
    #[error("cell construction failed: {0}")]
    Cell(#[from] CellError),
}
