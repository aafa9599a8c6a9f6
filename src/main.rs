mod db;
mod demo;
mod ipc;
mod logging;
mod model;
mod stats;
mod store;

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "schoold",
    version,
    about = "School administration store sidecar (JSON lines over stdin/stdout)"
)]
struct Cli {
    /// Seed the store with a small sample school.
    #[arg(long)]
    demo: bool,

    /// Log level filter; RUST_LOG takes precedence.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,

    /// Log output format (logs always go to stderr).
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let mut state = ipc::AppState::new()?;
    if cli.demo {
        demo::seed(&mut state.store)?;
        state.drain_changes();
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), demo = cli.demo, "schoold ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // Can't reply with an id.
                tracing::warn!(error = %e, "unparseable request");
                ipc::bad_json(e.to_string())
            }
        };

        if writeln!(stdout, "{resp}").and_then(|_| stdout.flush()).is_err() {
            tracing::warn!("stdout closed");
            break;
        }
    }

    tracing::info!(revision = state.store.revision(), "schoold exiting");
    Ok(())
}
