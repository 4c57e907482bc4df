use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// One JSON object per event, for journald and log shippers.
    Json,
    /// Human-readable lines on an interactive terminal.
    Pretty,
}

/// Mode for the stream logs are written to (stderr).
pub fn default_log_mode() -> LogMode {
    log_mode_for(io::stderr().is_terminal())
}

fn log_mode_for(stderr_is_terminal: bool) -> LogMode {
    if stderr_is_terminal {
        LogMode::Pretty
    } else {
        LogMode::Json
    }
}

/// Install the global subscriber.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_logging(mode: LogMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match mode {
        LogMode::Json => fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .flatten_event(true)
            .init(),
        LogMode::Pretty => fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init(),
    }
}
