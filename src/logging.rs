//! Diagnostic logging setup
//!
//! Logs go to stderr so they never mix with the report on stdout.
//! `RUST_LOG` takes precedence over the level picked from the CLI flags.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "depcoord=info"
    } else {
        "warn"
    }
}

/// Install the global subscriber
///
/// Returns false when a subscriber was already installed.
pub fn init(verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .is_ok()
}
