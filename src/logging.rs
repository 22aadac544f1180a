//! Structured logging setup using `tracing-subscriber`.
//!
//! Console-only: human-readable output on stderr so log lines never mix
//! with the interactive chat on stdout. `RUST_LOG` takes precedence; the
//! configured level is the fallback.

use tracing_subscriber::EnvFilter;

/// Initialise logging for the interactive CLI.
///
/// `default_level` is used when `RUST_LOG` is unset (e.g. `"info"`).
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
