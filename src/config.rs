//! Runtime configuration for the vanity address generator.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::crypto::{Network, WalletParams, WalletVersion, FRIENDLY_LEN};
use crate::matcher::SuffixPattern;

/// TON Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Config {
    /// Address suffix to search for (base64url characters: A-Z, a-z, 0-9, -, _)
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Case sensitive matching
    #[arg(short = 'c', long, default_value = "false")]
    pub case_sensitive: bool,

    /// Produce bounceable addresses (EQ/kQ) instead of non-bounceable (UQ/0Q)
    #[arg(short = 'b', long, default_value = "false")]
    pub bounce: bool,

    /// Number of worker threads (0 = number of CPU cores)
    #[arg(short = 't', long, default_value = "0")]
    pub threads: usize,

    /// Derive testnet addresses
    #[arg(long, default_value = "false")]
    pub testnet: bool,

    /// Wallet contract version: 4 (v4r2) or 5 (v5r1)
    #[arg(long = "version", value_name = "4|5", default_value = "5")]
    pub wallet_version: WalletVersion,

    /// Append found results to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "1")]
    pub report_interval: u64,

    /// Run in the background
    #[arg(short = 'd', long, default_value = "false")]
    pub daemon: bool,

    /// PID file used by the background process
    #[arg(long, default_value = "/tmp/ton_vanity.pid")]
    pub pid_file: PathBuf,

    /// Log file for the background process
    #[arg(long, default_value = "/tmp/ton_vanity.log")]
    pub log_file: PathBuf,

    /// Stop a running background process
    #[arg(long, default_value = "false")]
    pub stop: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop a running background process
    Stop,
}

impl Config {
    /// Returns true when the invocation only asks to stop a daemon.
    pub fn is_stop(&self) -> bool {
        self.stop || self.command == Some(Command::Stop)
    }

    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        resolve_worker_count(self.threads, num_cpus::get())
    }

    /// Returns the wallet parameters selected on the command line.
    pub fn wallet_params(&self) -> WalletParams {
        WalletParams {
            version: self.wallet_version,
            network: Network::from_testnet_flag(self.testnet),
            bounceable: self.bounce,
        }
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_stop() {
            return Ok(());
        }

        if self.suffix.is_empty() {
            return Err(ConfigError::InvalidSuffix("Suffix cannot be empty".into()));
        }

        if let Some(c) = self
            .suffix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ConfigError::InvalidSuffix(format!(
                "'{}' cannot appear in an address (allowed: A-Z, a-z, 0-9, -, _)",
                c
            )));
        }

        if self.suffix.len() > FRIENDLY_LEN {
            return Err(ConfigError::InvalidSuffix(format!(
                "Suffix cannot be longer than {} characters (full address)",
                FRIENDLY_LEN
            )));
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }

    /// Builds the immutable parameters shared by all workers.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            wallet: self.wallet_params(),
            suffix: self.suffix.clone(),
            case_sensitive: self.case_sensitive,
            workers: self.worker_count(),
        }
    }
}

/// Substitutes `available` for a requested count of 0, flooring at 1.
pub fn resolve_worker_count(requested: usize, available: usize) -> usize {
    if requested == 0 {
        available.max(1)
    } else {
        requested
    }
}

/// Immutable search parameters, shared by every worker of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub wallet: WalletParams,
    pub suffix: String,
    pub case_sensitive: bool,
    pub workers: usize,
}

impl SearchConfig {
    /// Compiles the suffix predicate.
    pub fn pattern(&self) -> SuffixPattern {
        SuffixPattern::new(self.suffix.clone(), self.case_sensitive)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid suffix: {0}")]
    InvalidSuffix(String),
    #[error("Report interval must be at least one second")]
    InvalidReportInterval,
}
