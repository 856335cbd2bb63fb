//! TON Vanity Address Generator CLI
//!
//! Usage:
//!   ton_vanity -s ABC                  # Find a v5r1 address ending with "abc" (any case)
//!   ton_vanity -s Ton -c --version 4   # Case-sensitive suffix on a v4r2 wallet
//!   ton_vanity -s dev -o found.txt -d  # Run in the background, save to found.txt
//!   ton_vanity stop                    # Stop the background run

use std::process;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::info;

use ton_vanity::worker::SearchState;
use ton_vanity::{Config, ResultSink, TonDeriver, WorkerPool};

fn main() {
    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        eprintln!("Usage: ton_vanity -s <SUFFIX> [OPTIONS] (see --help)");
        process::exit(1);
    }

    if config.is_stop() {
        stop_daemon(&config);
        return;
    }

    // Removes the PID file when a background run returns from main.
    let pid_guard = if config.daemon {
        start_daemon(&config)
    } else {
        None
    };

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    if pid_guard.is_some() {
        info!("Daemon started, running wallet generator...");
    }

    let search = config.search_config();
    let pattern = search.pattern();

    // Print startup info
    println!("TON Vanity Address Generator");
    println!("============================");
    println!("Suffix:     {}", pattern);
    println!("Difficulty: {}", pattern.difficulty_description());
    println!("Wallet:     {}", search.wallet.version);
    println!("Network:    {}", search.wallet.network);
    println!("Bounceable: {}", search.wallet.bounceable);
    println!("Workers:    {}", search.workers);
    println!();

    let state = Arc::new(SearchState::new());
    ctrlc_handler(state.clone());

    let pool = WorkerPool::with_state(search, TonDeriver::new(), state)
        .with_report_interval(config.report_interval());

    println!("Searching... (Press Ctrl+C to stop)\n");

    let outcome = match pool.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Search error: {}", e);
            drop(pid_guard);
            process::exit(1);
        }
    };

    match &outcome.result {
        Some(result) => {
            // Persistence failures are already logged; the printed match stands.
            let _ = ResultSink::new(config.output.clone()).report(result);
        }
        None => println!("Stopped before a match was found."),
    }

    // Print final stats
    println!("\n--- Final Statistics ---");
    println!("Addresses checked: {}", format_number(outcome.processed));
    println!("Time elapsed:      {:.2}s", outcome.elapsed.as_secs_f64());
    println!(
        "Average speed:     {}/s",
        format_number(outcome.per_second() as u64)
    );
}

#[cfg(unix)]
fn start_daemon(config: &Config) -> Option<ton_vanity::daemon::PidFileGuard> {
    use ton_vanity::daemon::{self, DaemonPaths, Role};

    let paths = DaemonPaths {
        pid_file: config.pid_file.clone(),
        log_file: config.log_file.clone(),
    };
    match daemon::daemonize(&paths) {
        Ok(Role::Daemon(guard)) => Some(guard),
        Ok(Role::Parent { exit_code }) => {
            println!("Daemon started successfully");
            println!("PID file: {}", paths.pid_file.display());
            println!("Log file: {}", paths.log_file.display());
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Daemon error: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(not(unix))]
fn start_daemon(_config: &Config) -> Option<()> {
    eprintln!("Daemon error: background mode is only supported on unix");
    process::exit(1);
}

#[cfg(unix)]
fn stop_daemon(config: &Config) {
    use ton_vanity::daemon::{self, StopOutcome};

    match daemon::stop(&config.pid_file) {
        Ok(StopOutcome::Stopped(pid)) => println!("Daemon stopped successfully (PID {})", pid),
        Ok(StopOutcome::NotRunning) => println!("Daemon is not running"),
        Err(e) => {
            eprintln!("Daemon error: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(not(unix))]
fn stop_daemon(_config: &Config) {
    eprintln!("Daemon error: background mode is only supported on unix");
    process::exit(1);
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(state: Arc<SearchState>) {
    ctrlc::set_handler(move || {
        state.stop();
    })
    .expect("Error setting Ctrl-C handler");
}
