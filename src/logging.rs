//! Logging initialization for the binaries.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber writing to stderr so stdout stays clean for responses.
///
/// `RUST_LOG` takes precedence over `default_directive` (e.g. `"info"`). Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
