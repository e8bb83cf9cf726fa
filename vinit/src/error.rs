//! Error types for startup-sequencer operations.

use std::ffi::NulError;
use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, vinit::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by startup-sequencer operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The handoff user does not exist in the user database.
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    /// The environment-store directory could not be read.
    #[error("environment directory {path}: {source}")]
    EnvDir {
        /// Directory that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A bounded retry policy ran out of attempts.
    ///
    /// The production policy is unbounded; this variant is only reachable
    /// through [`RetryPolicy::bounded`](crate::RetryPolicy::bounded).
    #[error("dependency not ready after {attempts} failed attempts")]
    AttemptsExhausted {
        /// Number of readiness checks that failed.
        attempts: u64,
    },

    /// A string argument contained an interior NUL byte.
    #[error("interior NUL byte in exec argument")]
    Nul(#[from] NulError),

    /// A system call failed.
    #[error(transparent)]
    Sys(#[from] nix::errno::Errno),

    /// An I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}
