//! Sets up structured logging on stderr.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins, then `PAGEGEN_LOG`, then
/// `log_level` from the command line, then `debug` when `verbose` is set and
/// `warn` otherwise. A bare level such as `info` applies to this crate only.
pub fn init(verbose: bool, log_level: Option<&str>) -> Result<()> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    let from_env = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("PAGEGEN_LOG"));
    let filter = match from_env {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(if level.contains('=') {
            level.to_string()
        } else {
            format!("pagegen={}", level)
        })?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
