//! Structured logging setup for the `quire` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The environment variable that overrides the command line log level,
/// e.g. `QUIRE_LOG=quire=trace`.
pub const LOG_ENV: &str = "QUIRE_LOG";

/// Installs a global subscriber writing to stderr. `verbose` raises the
/// default level from `info` to `debug`; an explicit `log_level` (either a
/// bare level like `info` or a full filter directive) wins over both, and
/// [`LOG_ENV`] wins over everything.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
    log_json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) if level.contains('=') => level.to_owned(),
        (_, Some(level)) => format!("quire={}", level),
        (true, None) => String::from("quire=debug"),
        (false, None) => String::from("quire=info"),
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
