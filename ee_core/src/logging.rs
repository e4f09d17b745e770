//! Logging setup for ee_core callers.
//!
//! Calculations emit `tracing` events; binaries call [`init`] once at startup.
//! Output goes to stderr so stdout can carry machine-readable results.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at the `warn` default level.
///
/// `RUST_LOG` overrides the default when set.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (debug, info, warn, error)
///
/// This can still be overridden by RUST_LOG environment variable.
/// Calling it a second time leaves the first subscriber in place.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
