//! Logging setup.
//!
//! Everything in the crate logs through `tracing`; this module installs the
//! subscriber that turns those events into stderr output.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Build the filter directive for `verbosity`, e.g. `flightboard=INFO`.
#[must_use]
pub fn default_directive(verbosity: Verbosity) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), verbosity.to_level_filter())
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG`, when set, replaces the verbosity-derived filter. Calling this
/// more than once is harmless; only the first call installs anything.
///
/// # Examples
///
/// ```no_run
/// use flightboard::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}
