//! Tracing setup shared by both binaries.
//!
//! Output goes to stderr so the delegate's stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Installs the global subscriber. `verbose` forces `debug`; otherwise the
/// filter comes from `TEMPO_LAUNCHER_LOG`, defaulting to `warn`.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
