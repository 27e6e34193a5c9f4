//! Diagnostic output.
//!
//! Degraded paths (camera refused, a contact unreachable, listener missing)
//! are reported as `tracing` events. They go to stderr; stdout belongs to the
//! status label.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Workflow milestones and warnings.
    #[default]
    Normal,
    /// Capture hand-offs, status changes and backend commands.
    Verbose,
    /// Everything.
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the number of `-v` flags to a level. `-q` wins.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "besafe=error",
            Self::Normal => "besafe=info",
            Self::Verbose => "besafe=debug",
            Self::Trace => "besafe=trace",
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Returns `false` if a subscriber was already installed.
///
/// ```no_run
/// use besafe::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .is_ok()
}
