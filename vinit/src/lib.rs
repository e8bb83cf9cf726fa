//! Container startup sequencer for the Viseron server.
//!
//! Runs once per container start: terminates stale media-worker processes
//! left over from an unclean shutdown, blocks until PostgreSQL accepts
//! connections, then replaces the current process image with the server
//! running as an unprivileged user.
//!
//! # Quick start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use vinit::{Handoff, PgIsReady, ProcTable, RetryPolicy, Sequencer};
//!
//! let probe = PgIsReady::new("viseron");
//! let handoff = Handoff {
//!     user: "abc".into(),
//!     display_name: Some("viseron".into()),
//!     program: "python3".into(),
//!     args: vec!["-u".into(), "-m".into(), "viseron".into()],
//!     workdir: "/src".into(),
//!     env_dir: Some("/var/run/s6/container_environment".into()),
//! };
//! let seq = Sequencer::new(RetryPolicy::unbounded(Duration::from_secs(1)));
//!
//! // Takes over the process — only returns on error.
//! let err = seq.run(&ProcTable, || probe.check(), &handoff).unwrap_err();
//! eprintln!("startup failed: {err}");
//! ```

mod envdir;
mod error;
mod handoff;
mod proc;
mod readiness;
mod sequencer;

pub use error::{Error, Result};
pub use handoff::{ExecTarget, Handoff};
#[cfg(target_os = "linux")]
pub use proc::ProcTable;
pub use proc::{ProcessTable, STALE_PREFIXES, kill_stale};
pub use readiness::{PgIsReady, RetryPolicy, wait_until_ready};
pub use sequencer::Sequencer;
