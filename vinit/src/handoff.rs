//! Privileged-to-unprivileged process replacement.
//!
//! The final sequencer step: enter the source root, drop to the service
//! user, and replace the current process image with the server. On
//! success nothing below [`Handoff::exec`] ever runs again — the PID now
//! belongs to the server.

use std::convert::Infallible;
use std::ffi::CString;
use std::path::PathBuf;

use crate::envdir;
use crate::error::{Error, Result};

/// A terminal exec target.
///
/// `exec` replaces the process image, so on success it **never returns**
/// — the `Ok` arm is uninhabited. Implemented by [`Handoff`] and by
/// recording fakes in sequencer tests.
pub trait ExecTarget {
    /// Replaces the current process image. Only returns on failure.
    fn exec(&self) -> Result<Infallible>;
}

/// The process image the sequencer hands control to.
#[derive(Debug, Clone)]
pub struct Handoff {
    /// Unprivileged user the target runs as.
    pub user: String,
    /// Value for the target's `argv[0]`, so process listings show a
    /// stable name instead of the interpreter path.
    pub display_name: Option<String>,
    /// Executable, resolved via `PATH`.
    pub program: String,
    /// Arguments, excluding `argv[0]`.
    pub args: Vec<String>,
    /// Working directory to enter before the exec.
    pub workdir: PathBuf,
    /// Directory-based environment store to inject, if any.
    pub env_dir: Option<PathBuf>,
}

impl Handoff {
    /// Builds the target `argv`: the display name (or the program, when
    /// none is set) followed by the arguments.
    fn argv(&self) -> Result<Vec<CString>> {
        let argv0 = self.display_name.as_deref().unwrap_or(&self.program);
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(CString::new(argv0)?);
        for arg in &self.args {
            argv.push(CString::new(arg.as_str())?);
        }
        Ok(argv)
    }

    /// Builds the target environment: the inherited environment with the
    /// env-store variables layered on top.
    fn envp(&self) -> Result<Vec<CString>> {
        let mut merged: Vec<(String, String)> = std::env::vars().collect();
        if let Some(dir) = &self.env_dir {
            for (key, value) in envdir::load(dir)? {
                match merged.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => merged.push((key, value)),
                }
            }
        }
        merged
            .into_iter()
            .map(|(k, v)| CString::new(format!("{k}={v}")).map_err(Error::from))
            .collect()
    }
}

#[cfg(target_os = "linux")]
impl ExecTarget for Handoff {
    fn exec(&self) -> Result<Infallible> {
        use nix::unistd::{self, User};

        unistd::chdir(self.workdir.as_path())?;

        // Assemble everything fallible before touching privileges.
        let argv = self.argv()?;
        let envp = self.envp()?;
        let program = CString::new(self.program.as_str())?;
        let user =
            User::from_name(&self.user)?.ok_or_else(|| Error::UnknownUser(self.user.clone()))?;

        // Supplementary groups, then gid, then uid — setuid first would
        // drop the privilege needed for the other two.
        let name = CString::new(self.user.as_str())?;
        unistd::initgroups(&name, user.gid)?;
        unistd::setgid(user.gid)?;
        unistd::setuid(user.uid)?;

        Ok(unistd::execvpe(&program, &argv, &envp)?)
    }
}
