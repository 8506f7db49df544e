//! Foreground execution of external programs.
//!
//! One child at a time: [`run`] spawns the program with the shell's stdio and
//! blocks until it terminates. There is no timeout and no cancellation.

use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Exit code reported when the program image could not be loaded.
pub const IMAGE_LOAD_EXIT_CODE: i32 = 127;

/// How a child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by a signal.
    Signaled(i32),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }

    fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::Exited(code),
            (None, Some(signal)) => ExitOutcome::Signaled(signal),
            // Stopped/continued statuses never reach us from a blocking wait.
            (None, None) => ExitOutcome::Exited(-1),
        }
    }
}

/// Failure to start a child.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The OS could not create a new process.
    #[error("failed to create process for {}: {source}", path.display())]
    ProcessCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The process was created but the image could not be executed.
    #[error("cannot execute {}: {source}", path.display())]
    ImageLoadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SpawnError {
    /// The outcome the shell records for this failure, if it stands in for one.
    pub fn exit_outcome(&self) -> Option<ExitOutcome> {
        match self {
            SpawnError::ImageLoadFailed { .. } => Some(ExitOutcome::Exited(IMAGE_LOAD_EXIT_CODE)),
            SpawnError::ProcessCreationFailed { .. } => None,
        }
    }

    fn classify(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.raw_os_error() {
            Some(
                libc::ENOENT | libc::EACCES | libc::ENOEXEC | libc::ENOTDIR | libc::ELOOP
                | libc::ETXTBSY | libc::ENAMETOOLONG,
            ) => SpawnError::ImageLoadFailed { path, source },
            _ => SpawnError::ProcessCreationFailed { path, source },
        }
    }
}

/// Run `resolved_path` in the foreground and wait for it.
///
/// `argv[0]` is passed to the child as its name (conventionally the command
/// as typed); the rest are its arguments. Stdio is inherited unchanged.
pub fn run(resolved_path: &Path, argv: &[&str]) -> Result<ExitOutcome, SpawnError> {
    let mut command = Command::new(resolved_path);
    if let Some((name, args)) = argv.split_first() {
        command.arg0(name).args(args);
    }

    let status = command
        .status()
        .map_err(|e| SpawnError::classify(resolved_path, e))?;
    let outcome = ExitOutcome::from_status(status);
    log::debug!("{} finished: {:?}", resolved_path.display(), outcome);
    Ok(outcome)
}
