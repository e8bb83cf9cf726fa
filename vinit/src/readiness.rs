//! Dependency readiness polling.
//!
//! The server cannot start until PostgreSQL accepts connections, so the
//! sequencer blocks in [`wait_until_ready`] — a fixed-interval retry loop
//! with no timeout and no backoff. If the database never comes up, the
//! container stays in the wait state instead of starting a server that
//! cannot work.

use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::info;

use crate::error::{Error, Result};

/// Fixed-interval retry policy.
///
/// Production use is [`RetryPolicy::unbounded`]; [`RetryPolicy::bounded`]
/// exists so tests can put a ceiling on the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep between attempts.
    pub interval: Duration,
    /// Maximum number of failed attempts, or `None` to retry forever.
    pub max_attempts: Option<u64>,
}

impl RetryPolicy {
    /// Retries forever at `interval`.
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Gives up with [`Error::AttemptsExhausted`] after `max_attempts`
    /// failed checks.
    pub const fn bounded(interval: Duration, max_attempts: u64) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Blocks until `check` returns `true`.
///
/// Emits one info line per failed attempt and sleeps `policy.interval`
/// between attempts. Returns the number of failed attempts that preceded
/// success.
pub fn wait_until_ready(mut check: impl FnMut() -> bool, policy: RetryPolicy) -> Result<u64> {
    let mut failed = 0u64;
    loop {
        if check() {
            return Ok(failed);
        }
        failed += 1;
        info!("Waiting...");
        if policy.max_attempts.is_some_and(|max| failed >= max) {
            return Err(Error::AttemptsExhausted { attempts: failed });
        }
        std::thread::sleep(policy.interval);
    }
}

/// Readiness probe backed by the `pg_isready` utility.
///
/// `pg_isready` exits zero iff the target database accepts connections;
/// nothing about its output is relied upon. Failure to launch the probe
/// itself (not installed yet, `PATH` not populated) counts as "not ready"
/// and is retried like any other failed attempt.
#[derive(Debug, Clone)]
pub struct PgIsReady {
    /// Probe executable, normally `pg_isready`.
    program: String,
    /// Target database name.
    dbname: String,
}

impl PgIsReady {
    /// Creates a probe for `dbname` using the stock `pg_isready` binary.
    pub fn new(dbname: impl Into<String>) -> Self {
        Self::with_program("pg_isready", dbname)
    }

    /// Creates a probe with an explicit executable.
    pub fn with_program(program: impl Into<String>, dbname: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            dbname: dbname.into(),
        }
    }

    /// Runs the probe once. `true` iff it exited zero.
    pub fn check(&self) -> bool {
        Command::new(&self.program)
            .args(["-q", "-d", &self.dbname])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn immediate_success_makes_no_attempts() {
        let failed = wait_until_ready(|| true, RetryPolicy::bounded(Duration::ZERO, 1)).unwrap();
        assert_eq!(failed, 0);
    }

    #[test]
    fn fails_twice_then_succeeds() {
        let calls = Cell::new(0u64);
        let check = || {
            calls.set(calls.get() + 1);
            calls.get() > 2
        };
        let failed = wait_until_ready(check, RetryPolicy::bounded(Duration::ZERO, 10)).unwrap();
        assert_eq!(failed, 2);
        // Two failures plus the succeeding attempt, nothing after.
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn bounded_policy_exhausts() {
        let calls = Cell::new(0u64);
        let check = || {
            calls.set(calls.get() + 1);
            false
        };
        let err = wait_until_ready(check, RetryPolicy::bounded(Duration::ZERO, 5)).unwrap_err();
        match err {
            Error::AttemptsExhausted { attempts } => assert_eq!(attempts, 5),
            other => panic!("expected AttemptsExhausted, got {other}"),
        }
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn probe_reports_exit_status() {
        // `true` and `false` stand in for pg_isready; only the exit
        // status is part of the contract.
        assert!(PgIsReady::with_program("true", "viseron").check());
        assert!(!PgIsReady::with_program("false", "viseron").check());
    }

    #[test]
    fn missing_probe_binary_counts_as_not_ready() {
        let probe = PgIsReady::with_program("/nonexistent/pg_isready", "viseron");
        assert!(!probe.check());
    }
}
