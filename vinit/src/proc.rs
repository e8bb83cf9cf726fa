//! Process-table access for stale worker cleanup.
//!
//! A prior container instance that died uncleanly can leave orphaned
//! ffmpeg / GStreamer workers holding cameras or ports, so [`kill_stale`]
//! clears them before the server starts. The table sits behind the
//! [`ProcessTable`] trait so tests can substitute a fake.

use nix::unistd::Pid;

/// Worker-process name prefixes cleared at startup.
///
/// `ffmpeg` covers the transcoder workers, `gst-launch` the GStreamer
/// pipeline workers.
pub const STALE_PREFIXES: &[&str] = &["ffmpeg", "gst-launch"];

/// Read/terminate access to the operating-system process table.
pub trait ProcessTable {
    /// Returns the PIDs of all processes whose invocation name starts
    /// with `prefix`.
    fn list_matching(&self, prefix: &str) -> Vec<Pid>;

    /// Requests termination of `pid`.
    ///
    /// Delivery is best-effort; the process may already be gone.
    fn terminate(&self, pid: Pid);
}

/// Terminates every process matching one of `prefixes`.
///
/// The calling process itself is skipped and all failures are swallowed:
/// no matching process is the common case after a clean shutdown, not an
/// error. Returns the number of processes signalled.
pub fn kill_stale(table: &impl ProcessTable, prefixes: &[&str]) -> usize {
    let own = Pid::this();
    let mut signalled = 0;
    for prefix in prefixes {
        for pid in table.list_matching(prefix) {
            if pid == own {
                continue;
            }
            table.terminate(pid);
            signalled += 1;
        }
    }
    signalled
}

/// The `/proc`-backed process table.
///
/// Matching is done against `/proc/<pid>/comm` — the executable basename
/// as tracked by the kernel (truncated to 15 bytes), not the full command
/// line. A process whose arguments merely mention `ffmpeg` is left alone.
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcTable;

#[cfg(target_os = "linux")]
impl ProcessTable for ProcTable {
    fn list_matching(&self, prefix: &str) -> Vec<Pid> {
        let mut pids = Vec::new();
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return pids;
        };
        for entry in entries.flatten() {
            // Numeric directory names are PIDs; everything else under
            // /proc is kernel bookkeeping.
            let name = entry.file_name();
            let Some(pid) = name.to_str().and_then(|s| s.parse::<i32>().ok()) else {
                continue;
            };
            // The process may exit between readdir and this read.
            let Ok(comm) = std::fs::read_to_string(entry.path().join("comm")) else {
                continue;
            };
            if comm.trim_end().starts_with(prefix) {
                pids.push(Pid::from_raw(pid));
            }
        }
        pids
    }

    fn terminate(&self, pid: Pid) {
        let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
    }
}
