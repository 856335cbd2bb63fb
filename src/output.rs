//! Rendering and persistence of a found match.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::worker::MatchResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
#[error("failed to save result to {}: {source}", path.display())]
pub struct PersistenceError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl PersistenceError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The report printed to stdout.
pub fn render_display(result: &MatchResult) -> String {
    format!(
        "=== FOUND ===\nSeed phrase: {}\nWallet address: {}",
        result.seed_phrase, result.address
    )
}

/// The record appended to the output file.
pub fn render_record(result: &MatchResult) -> String {
    format!(
        "=== FOUND {} ===\nSeed: {}\nAddress: {}\n\n",
        result.found_at.format(TIMESTAMP_FORMAT),
        result.seed_phrase,
        result.address
    )
}

/// Appends the record for `result` to `path`, creating the file if absent.
pub fn append_record(path: &Path, result: &MatchResult) -> Result<(), PersistenceError> {
    let wrap = |source| PersistenceError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;
    file.write_all(render_record(result).as_bytes())
        .map_err(wrap)?;
    file.sync_all().map_err(wrap)
}

/// Shows a match to the user and optionally saves it.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    output: Option<PathBuf>,
}

impl ResultSink {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Prints the match and persists it if an output file is configured.
    ///
    /// A failed write is logged and returned; the printed match stands either way.
    pub fn report(&self, result: &MatchResult) -> Result<(), PersistenceError> {
        println!("{}", render_display(result));

        let Some(path) = self.output() else {
            return Ok(());
        };
        match append_record(path, result) {
            Ok(()) => {
                println!("Results saved to: {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }
}
