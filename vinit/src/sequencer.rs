//! The startup sequence itself.
//!
//! Two states: `WAITING` while the readiness loop spins, `RUNNING` once
//! the exec fires. The transition happens exactly once, on the first
//! successful readiness check, and `RUNNING` is terminal — on success
//! control never comes back here.

use std::convert::Infallible;

use tracing::{debug, info};

use crate::error::Result;
use crate::handoff::ExecTarget;
use crate::proc::{self, ProcessTable};
use crate::readiness::{self, RetryPolicy};

/// Orchestrates cleanup, the readiness wait, and the handoff.
#[derive(Debug, Clone)]
pub struct Sequencer {
    /// Invocation-name prefixes cleared before the wait.
    pub stale_prefixes: Vec<String>,
    /// Readiness retry policy.
    pub policy: RetryPolicy,
}

impl Sequencer {
    /// Creates a sequencer with the default worker prefixes.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            stale_prefixes: proc::STALE_PREFIXES
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            policy,
        }
    }

    /// Runs the sequence: stale cleanup, readiness wait, handoff.
    ///
    /// Only returns on failure — either a bounded retry policy ran out
    /// of attempts (test policies) or the exec itself failed. Either way
    /// the caller is expected to exit non-zero; there is no recovery path.
    pub fn run(
        &self,
        table: &impl ProcessTable,
        check: impl FnMut() -> bool,
        target: &impl ExecTarget,
    ) -> Result<Infallible> {
        let prefixes: Vec<&str> = self.stale_prefixes.iter().map(String::as_str).collect();
        let killed = proc::kill_stale(table, &prefixes);
        if killed > 0 {
            debug!(killed, "terminated stale worker processes");
        }

        readiness::wait_until_ready(check, self.policy)?;
        info!("Server has started!");

        target.exec()
    }
}
