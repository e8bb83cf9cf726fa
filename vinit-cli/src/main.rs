//! Container entrypoint for the Viseron server.
//!
//! `vinit` terminates stale media workers, waits for PostgreSQL, then
//! execs the server as the unprivileged service user. Every flag defaults
//! to the values baked into the Viseron container image, so the bare
//! invocation reproduces the stock entrypoint.

#![allow(clippy::print_stderr, clippy::missing_docs_in_private_items)]

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("vinit only runs inside a Linux container");
    std::process::exit(1);
}

#[cfg(target_os = "linux")]
fn main() {
    entry::main()
}

#[cfg(target_os = "linux")]
mod entry {
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::Parser;
    use tracing_subscriber::EnvFilter;
    use vinit::{Handoff, PgIsReady, ProcTable, RetryPolicy, Sequencer};

    /// Startup sequencer for the Viseron container.
    ///
    /// Usage: `vinit [OPTIONS] [COMMAND [ARG...]]`
    #[derive(Parser)]
    #[command(name = "vinit", version, about = "Container startup sequencer for the Viseron server")]
    struct Cli {
        /// Database whose readiness gates the startup.
        #[arg(long, default_value = "viseron")]
        dbname: String,

        /// Readiness probe executable.
        #[arg(long, default_value = "pg_isready")]
        pg_isready: String,

        /// Seconds between readiness attempts.
        #[arg(long, default_value_t = 1)]
        interval: u64,

        /// Unprivileged user the server runs as.
        #[arg(long, default_value = "abc")]
        user: String,

        /// Process name shown for the server in process listings.
        #[arg(long, default_value = "viseron")]
        display_name: String,

        /// Server source root to enter before the exec.
        #[arg(long, default_value = "/src")]
        workdir: PathBuf,

        /// Directory-based environment store injected at handoff.
        #[arg(long, default_value = "/var/run/s6/container_environment")]
        env_dir: PathBuf,

        /// Skip environment injection entirely.
        #[arg(long)]
        no_env_dir: bool,

        /// Stale worker name prefix terminated at startup (repeatable).
        #[arg(
            long = "kill-prefix",
            default_values_t = [String::from("ffmpeg"), String::from("gst-launch")]
        )]
        kill_prefix: Vec<String>,

        /// Command to exec once the database is ready.
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            default_values_t = [
                String::from("python3"),
                String::from("-u"),
                String::from("-m"),
                String::from("viseron"),
            ]
        )]
        command: Vec<String>,
    }

    pub(crate) fn main() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();

        let (program, args) = match cli.command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => {
                eprintln!("vinit: empty command");
                std::process::exit(2);
            }
        };

        let probe = PgIsReady::with_program(cli.pg_isready, cli.dbname);
        let handoff = Handoff {
            user: cli.user,
            display_name: Some(cli.display_name),
            program,
            args,
            workdir: cli.workdir,
            env_dir: (!cli.no_env_dir).then_some(cli.env_dir),
        };
        let seq = Sequencer {
            stale_prefixes: cli.kill_prefix,
            policy: RetryPolicy::unbounded(Duration::from_secs(cli.interval)),
        };

        match seq.run(&ProcTable, || probe.check(), &handoff) {
            // run() never returns on success — the process is the server.
            Ok(never) => match never {},
            Err(e) => {
                eprintln!("vinit: {e}");
                std::process::exit(1);
            }
        }
    }
}
