//! Background-process lifecycle: start with a PID file, stop by signal.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use daemonize::{Daemonize, Outcome};
use log::warn;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
    #[error("failed to start daemon: {0}")]
    Start(#[from] daemonize::Error),
    #[error("cannot access PID file {}: {source}", path.display())]
    PidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("PID file {} does not contain a valid PID: {contents:?}", path.display())]
    InvalidPid { path: PathBuf, contents: String },
    #[error("failed to signal process {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: io::Error,
    },
}

/// Files used by a background run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonPaths {
    pub pid_file: PathBuf,
    pub log_file: PathBuf,
}

/// Which side of the fork the caller is on after [`daemonize`].
#[derive(Debug)]
pub enum Role {
    /// The launching process; it should exit with `exit_code`.
    Parent { exit_code: i32 },
    /// The detached process that runs the search. Keep the guard alive for the whole run.
    Daemon(PidFileGuard),
}

/// Removes the daemon's PID file when dropped.
#[derive(Debug)]
pub struct PidFileGuard {
    path: PathBuf,
}

impl PidFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        if let Err(e) = remove_pid_file(&self.path) {
            warn!("{}", e);
        }
    }
}

/// Result of [`stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// SIGTERM was delivered to this PID.
    Stopped(i32),
    /// No live process owned the PID file.
    NotRunning,
}

/// Detaches from the terminal, writes the PID file and redirects stdout and
/// stderr to the log file.
///
/// Must be called before any thread is spawned.
pub fn daemonize(paths: &DaemonPaths) -> Result<Role, DaemonError> {
    let open_log = || {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.log_file)
            .map_err(|source| DaemonError::LogFile {
                path: paths.log_file.clone(),
                source,
            })
    };
    let stdout = open_log()?;
    let stderr = open_log()?;
    let cwd = std::env::current_dir().map_err(DaemonError::WorkingDirectory)?;

    let daemon = Daemonize::new()
        .pid_file(&paths.pid_file)
        .working_directory(cwd)
        .umask(0o027u32)
        .stdout(stdout)
        .stderr(stderr);

    match daemon.execute() {
        Outcome::Parent(Ok(parent)) => Ok(Role::Parent {
            exit_code: parent.first_child_exit_code,
        }),
        Outcome::Parent(Err(e)) | Outcome::Child(Err(e)) => Err(e.into()),
        Outcome::Child(Ok(_)) => Ok(Role::Daemon(PidFileGuard::new(&paths.pid_file))),
    }
}

/// Sends SIGTERM to the process named in `pid_file` and removes the file.
///
/// A running daemon holds an exclusive `flock` on its PID file. A missing
/// file, or one nobody holds the lock on, is reported as
/// [`StopOutcome::NotRunning`]; such a stale file is removed without
/// signalling the PID it names.
pub fn stop(pid_file: &Path) -> Result<StopOutcome, DaemonError> {
    let pid_error = |source: io::Error| DaemonError::PidFile {
        path: pid_file.to_path_buf(),
        source,
    };

    let mut file = match File::open(pid_file) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StopOutcome::NotRunning),
        Err(source) => return Err(pid_error(source)),
    };
    if !is_locked(&file).map_err(pid_error)? {
        remove_pid_file(pid_file)?;
        return Ok(StopOutcome::NotRunning);
    }

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(pid_error)?;
    let pid = parse_pid(&contents).ok_or_else(|| DaemonError::InvalidPid {
        path: pid_file.to_path_buf(),
        contents: contents.clone(),
    })?;

    let outcome = match send_signal(pid, libc::SIGTERM) {
        Ok(()) => StopOutcome::Stopped(pid),
        Err(e) if e.raw_os_error() == Some(libc::ESRCH) => StopOutcome::NotRunning,
        Err(source) => return Err(DaemonError::Signal { pid, source }),
    };

    remove_pid_file(pid_file)?;
    Ok(outcome)
}

/// Parses a PID file body. Only positive PIDs are accepted, so a garbled
/// file can never address a process group.
fn parse_pid(contents: &str) -> Option<i32> {
    contents.trim().parse::<i32>().ok().filter(|pid| *pid > 0)
}

/// Returns true if another open file description holds an exclusive lock on `file`.
///
/// A lock granted here is released as soon as `file` is closed.
fn is_locked(file: &File) -> io::Result<bool> {
    // SAFETY: the descriptor belongs to `file`, which outlives the call.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(false);
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(true)
    } else {
        Err(err)
    }
}

fn send_signal(pid: i32, signal: libc::c_int) -> io::Result<()> {
    // SAFETY: kill has no memory-safety preconditions.
    if unsafe { libc::kill(pid, signal) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn remove_pid_file(pid_file: &Path) -> Result<(), DaemonError> {
    match fs::remove_file(pid_file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DaemonError::PidFile {
            path: pid_file.to_path_buf(),
            source,
        }),
    }
}
