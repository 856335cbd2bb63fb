//! Suffix matching for TON user-friendly addresses.
//!
//! Matching is either byte-exact or case-insensitive. In the latter case both
//! the whole address and the whole suffix are lowercased before comparison.

mod pattern;

pub use pattern::{matches, SuffixPattern};
